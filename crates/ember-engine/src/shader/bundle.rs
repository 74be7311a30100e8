use std::fs;
use std::path::Path;

use super::error::ShaderError;

/// The directive token that introduces a section switch.
const DIRECTIVE: &str = "#shader";

/// Which section the parser is currently filling.
enum Section {
    None,
    Vertex,
    Fragment,
}

/// Vertex + fragment source pair split out of one bundle file.
///
/// Sections are opaque text blobs; the parser restores line terminators but
/// never interprets the shader source itself. Immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderBundle {
    pub vertex_source: String,
    pub fragment_source: String,
}

impl ShaderBundle {
    /// Reads and parses a bundle file.
    ///
    /// A file that cannot be opened or read is a distinct I/O error, not an
    /// empty bundle.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text)
    }

    /// Splits bundle text into per-stage sources.
    ///
    /// A line whose first whitespace-separated token is `#shader` switches
    /// the active section according to its second token (`vertex` or
    /// `fragment`) and is itself excluded from the output. A directive with
    /// an unrecognized stage name is discarded without switching sections.
    /// Every other line is appended to the active section with its line
    /// terminator restored. A content line seen before the first directive
    /// has nowhere to go and is a configuration error.
    pub fn parse_str(text: &str) -> Result<Self, ShaderError> {
        let mut section = Section::None;
        let mut vertex = String::new();
        let mut fragment = String::new();

        for (idx, line) in text.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            if tokens.next() == Some(DIRECTIVE) {
                match tokens.next() {
                    Some("vertex") => section = Section::Vertex,
                    Some("fragment") => section = Section::Fragment,
                    other => {
                        log::warn!(
                            "ignoring #shader directive with unknown stage {:?} on line {}",
                            other,
                            idx + 1
                        );
                    }
                }
                continue;
            }

            let target = match section {
                Section::None => return Err(ShaderError::UnassignedLine { line: idx + 1 }),
                Section::Vertex => &mut vertex,
                Section::Fragment => &mut fragment,
            };
            target.push_str(line);
            target.push('\n');
        }

        Ok(Self {
            vertex_source: vertex,
            fragment_source: fragment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ShaderBundle {
        ShaderBundle::parse_str(src).unwrap()
    }

    // ── section splitting ─────────────────────────────────────────────────

    #[test]
    fn splits_vertex_then_fragment() {
        let b = parse("#shader vertex\nA\n#shader fragment\nB\n");
        assert_eq!(b.vertex_source, "A\n");
        assert_eq!(b.fragment_source, "B\n");
    }

    #[test]
    fn splits_fragment_then_vertex() {
        let b = parse("#shader fragment\nB\n#shader vertex\nA\n");
        assert_eq!(b.vertex_source, "A\n");
        assert_eq!(b.fragment_source, "B\n");
    }

    #[test]
    fn directive_lines_are_excluded_from_output() {
        let b = parse("#shader vertex\n#shader fragment\nB\n");
        assert!(b.vertex_source.is_empty());
        assert_eq!(b.fragment_source, "B\n");
        assert!(!b.fragment_source.contains("#shader"));
    }

    #[test]
    fn single_section_leaves_the_other_empty() {
        let b = parse("#shader vertex\nonly vertex\n");
        assert_eq!(b.vertex_source, "only vertex\n");
        assert!(b.fragment_source.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_bundle() {
        assert_eq!(parse(""), ShaderBundle::default());
    }

    // ── line fidelity ─────────────────────────────────────────────────────

    #[test]
    fn non_directive_lines_round_trip_newline_preserved() {
        let src = "#shader vertex\nfn a() {}\n\n  indented\n#shader fragment\nfn b() {}\n";
        let b = parse(src);
        let expected: String = src
            .lines()
            .filter(|l| !l.trim_start().starts_with("#shader"))
            .map(|l| format!("{l}\n"))
            .collect();
        assert_eq!(format!("{}{}", b.vertex_source, b.fragment_source), expected);
    }

    #[test]
    fn blank_lines_are_kept() {
        let b = parse("#shader vertex\n\nA\n");
        assert_eq!(b.vertex_source, "\nA\n");
    }

    #[test]
    fn directive_tolerates_leading_whitespace_and_extra_spacing() {
        let b = parse("  #shader   vertex\nA\n");
        assert_eq!(b.vertex_source, "A\n");
    }

    // ── error cases ───────────────────────────────────────────────────────

    #[test]
    fn content_before_any_directive_is_an_error() {
        let err = ShaderBundle::parse_str("stray line\n#shader vertex\nA\n").unwrap_err();
        assert!(matches!(err, ShaderError::UnassignedLine { line: 1 }));
    }

    #[test]
    fn unassigned_line_reports_one_based_line_number() {
        let err = ShaderBundle::parse_str("#shader unknown\nstray\n").unwrap_err();
        assert!(matches!(err, ShaderError::UnassignedLine { line: 2 }));
    }

    #[test]
    fn unknown_stage_directive_is_discarded_without_switching() {
        let b = parse("#shader vertex\nA\n#shader geometry\nB\n");
        assert_eq!(b.vertex_source, "A\nB\n");
        assert!(b.fragment_source.is_empty());
    }

    #[test]
    fn bare_directive_is_discarded() {
        let b = parse("#shader vertex\nA\n#shader\nB\n");
        assert_eq!(b.vertex_source, "A\nB\n");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ShaderBundle::load("res/does/not/exist.shader").unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }
}
