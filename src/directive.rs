use crate::error::Result;
use regex::Regex;

/// Default name of the directory macro
pub const DEFAULT_DIR_MACRO: &str = r"\dir";

/// How a single source line is treated during flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Whole-line `%` comment, dropped from the output
    Comment,
    /// `\newcommand{\dir}{value}`, updates the directory prefix
    DirDefinition { value: &'a str },
    /// `\input{path.tex}`, replaced by the flattened target
    Include { target: &'a str },
    /// Anything else, copied through verbatim
    Content,
}

/// Classifies lines using the macro-definition and include patterns
#[derive(Debug, Clone)]
pub struct DirectiveParser {
    definition: Regex,
    include: Regex,
    macro_name: String,
}

impl DirectiveParser {
    /// Builds a parser that treats `macro_name` as the directory macro
    ///
    /// # Errors
    ///
    /// Returns `FlattenError::Regex` if there's an error compiling the patterns.
    pub fn new(macro_name: &str) -> Result<Self> {
        Ok(Self {
            definition: Regex::new(r"newcommand\{(.*)\}\{(.*)\}")?,
            include: Regex::new(r"\\input\{(.*\.tex)\}")?,
            macro_name: macro_name.to_string(),
        })
    }

    /// The macro name this parser recognizes as the directory variable
    pub fn macro_name(&self) -> &str {
        &self.macro_name
    }

    /// Classifies one line. The line may still carry its terminator.
    pub fn classify<'a>(&self, line: &'a str) -> Directive<'a> {
        if line.trim_start().starts_with('%') {
            return Directive::Comment;
        }

        // Definitions of other macros are not consumed and fall through
        if let Some(caps) = self.definition.captures(line)
            && let (Some(name), Some(value)) = (caps.get(1), caps.get(2))
            && name.as_str() == self.macro_name
        {
            return Directive::DirDefinition {
                value: value.as_str(),
            };
        }

        if let Some(target) = self.include.captures(line).and_then(|caps| caps.get(1)) {
            return Directive::Include {
                target: target.as_str(),
            };
        }

        Directive::Content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DirectiveParser {
        DirectiveParser::new(DEFAULT_DIR_MACRO).unwrap()
    }

    #[test]
    fn test_comment_lines() {
        let p = parser();
        assert_eq!(p.classify("% a comment\n"), Directive::Comment);
        assert_eq!(p.classify("   \t% indented\n"), Directive::Comment);
        assert_eq!(p.classify(r"% \input{skip.tex}"), Directive::Comment);
        assert_eq!(p.classify(r"%\newcommand{\dir}{x/}"), Directive::Comment);
    }

    #[test]
    fn test_trailing_comment_is_not_a_comment_line() {
        let p = parser();
        assert_eq!(p.classify("text % note\n"), Directive::Content);
    }

    #[test]
    fn test_dir_definition() {
        let p = parser();
        assert_eq!(
            p.classify("\\newcommand{\\dir}{chapters/}\n"),
            Directive::DirDefinition { value: "chapters/" }
        );
        // No leading backslash required
        assert_eq!(
            p.classify(r"newcommand{\dir}{sub/}"),
            Directive::DirDefinition { value: "sub/" }
        );
        assert_eq!(
            p.classify("\\newcommand{\\dir}{}\r\n"),
            Directive::DirDefinition { value: "" }
        );
    }

    #[test]
    fn test_other_macro_definition_is_content() {
        let p = parser();
        assert_eq!(
            p.classify("\\newcommand{\\thesistitle}{On Things}\n"),
            Directive::Content
        );
    }

    #[test]
    fn test_other_macro_definition_with_include_is_include() {
        let p = parser();
        assert_eq!(
            p.classify(r"\newcommand{\foo}{bar} \input{x.tex}"),
            Directive::Include { target: "x.tex" }
        );
    }

    #[test]
    fn test_include() {
        let p = parser();
        assert_eq!(
            p.classify("\\input{\\dirintro.tex}\n"),
            Directive::Include {
                target: r"\dirintro.tex"
            }
        );
        assert_eq!(
            p.classify("  \\input{chapters/one.tex}  \n"),
            Directive::Include {
                target: "chapters/one.tex"
            }
        );
    }

    #[test]
    fn test_malformed_include_is_content() {
        let p = parser();
        assert_eq!(p.classify(r"\input{foo}"), Directive::Content);
        assert_eq!(p.classify(r"\input{foo.tex"), Directive::Content);
        assert_eq!(p.classify(r"input{foo.tex}"), Directive::Content);
        assert_eq!(p.classify(r"\include{foo.tex}"), Directive::Content);
    }

    #[test]
    fn test_custom_macro_name() {
        let p = DirectiveParser::new(r"\chapterdir").unwrap();
        assert_eq!(p.macro_name(), r"\chapterdir");
        assert_eq!(
            p.classify(r"\newcommand{\chapterdir}{ch/}"),
            Directive::DirDefinition { value: "ch/" }
        );
        assert_eq!(p.classify(r"\newcommand{\dir}{ch/}"), Directive::Content);
    }

    #[test]
    fn test_plain_content() {
        let p = parser();
        assert_eq!(p.classify("\n"), Directive::Content);
        assert_eq!(p.classify(""), Directive::Content);
        assert_eq!(p.classify("Some prose.\n"), Directive::Content);
    }
}
