//! Prompt and template text for extraction and synthesis

use crate::types::{FeatureSummary, RepoFile};

/// Repository files as `### path` sections separated by blank lines
pub fn render_files(files: &[RepoFile]) -> String {
    files
        .iter()
        .map(|f| format!("### {}\n{}", f.path, f.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Analysis request asking for `{features, techStack, summary}` JSON
pub fn extraction_prompt(files: &[RepoFile]) -> String {
    format!(
        r#"You are a software analyst AI.
Analyze the following repo files and extract:

1. Key Features
2. Technology Stack
3. Brief Summary
4. Noteworthy Functionalities

Respond in JSON format with:
{{
  "features": [...],
  "techStack": [...],
  "summary": "..."
}}

Respond ONLY with valid JSON, no explanation.

Repo Files:
{}
"#,
        render_files(files)
    )
}

/// README request built from a normalized summary
pub fn synthesis_prompt(summary: &FeatureSummary) -> String {
    format!(
        r#"You are a senior developer AI assistant.
Using the following project information, generate a professional README.md file in GitHub Markdown format.

### Summary:
{}

### Features:
{}

### Tech Stack:
{}

Format:
- Title
- Short Description
- Features (bullet points)
- Tech Stack (bullet points)
- Installation steps
- Usage
- Optional: Contribution, License, Contact

Return only the markdown content as a string.
"#,
        summary.summary,
        bullets(&summary.features),
        bullets(&summary.tech_stack)
    )
}

/// Title from the first three words of the summary
fn template_title(summary: &str) -> String {
    let words: Vec<&str> = summary.split_whitespace().take(3).collect();
    format!("# {} Project", words.join(" "))
}

/// Deterministic README rendered from a summary without any network call
pub fn template_readme(summary: &FeatureSummary) -> String {
    format!(
        "{}\n\n## Description\n{}\n\n## Features\n{}\n\n## Tech Stack\n{}\n\n{}",
        template_title(&summary.summary),
        summary.summary,
        bullets(&summary.features),
        bullets(&summary.tech_stack),
        TEMPLATE_TAIL
    )
}

const TEMPLATE_TAIL: &str = r#"## Installation

```bash
# Clone the repository
git clone <repository-url>

# Install dependencies
npm install

# Start the application
npm start
```

## Usage

```bash
# Run the application
npm start
```

## Contributing

1. Fork the repository
2. Create your feature branch (`git checkout -b feature/amazing-feature`)
3. Commit your changes (`git commit -m 'Add some amazing feature'`)
4. Push to the branch (`git push origin feature/amazing-feature`)
5. Open a Pull Request

## License

This project is licensed under the MIT License - see the [LICENSE](LICENSE) file for details.

## Contact

- Project Link: [https://github.com/username/project](https://github.com/username/project)
"#;

/// README returned when LLM synthesis fails
pub const FALLBACK_README: &str = r#"# Project README

## Description
This is a software project. Due to an error during README generation, a basic template is provided.

## Features
- Feature extraction was incomplete

## Tech Stack
- Technology stack could not be determined

## Installation
```bash
# Installation steps would go here
```

## Usage
Please refer to the project documentation for usage instructions.

## Contributing
Contributions are welcome! Please feel free to submit a Pull Request.

## License
This project is licensed under the MIT License.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> FeatureSummary {
        FeatureSummary::new(
            vec!["REST API".into(), "Testing framework".into()],
            vec!["Rust".into()],
            "A Rust project with rest api capabilities.",
        )
    }

    #[test]
    fn test_render_files() {
        let files = vec![RepoFile::new("a.rs", "fn a() {}"), RepoFile::new("b.md", "# B")];
        assert_eq!(render_files(&files), "### a.rs\nfn a() {}\n\n### b.md\n# B");
    }

    #[test]
    fn test_extraction_prompt_contains_files() {
        let prompt = extraction_prompt(&[RepoFile::new("Cargo.toml", "[package]")]);
        assert!(prompt.contains("\"techStack\""));
        assert!(prompt.contains("### Cargo.toml\n[package]"));
    }

    #[test]
    fn test_synthesis_prompt_lists_bullets() {
        let prompt = synthesis_prompt(&summary());
        assert!(prompt.contains("### Features:\n- REST API\n- Testing framework\n"));
        assert!(prompt.contains("### Tech Stack:\n- Rust\n"));
    }

    #[test]
    fn test_template_sections() {
        let readme = template_readme(&summary());
        assert!(readme.starts_with("# A Rust project Project\n"));
        for section in [
            "## Description",
            "## Features",
            "## Tech Stack",
            "## Installation",
            "## Usage",
            "## Contributing",
            "## License",
            "## Contact",
        ] {
            assert!(readme.contains(section), "missing {section}");
        }
        assert!(readme.contains("## Features\n- REST API\n- Testing framework\n"));
    }

    #[test]
    fn test_template_title_short_summary() {
        assert_eq!(template_title("Tool"), "# Tool Project");
    }
}
