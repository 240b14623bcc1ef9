use std::sync::LazyLock;

use regex::Regex;

// A section runs from its `## <title>` line up to the next `## ` heading
static RESOURCE_TYPES: LazyLock<Regex> = LazyLock::new(|| h2_section("Resource Types"));
static PARAMETERS: LazyLock<Regex> = LazyLock::new(|| h2_section("Parameters"));

static LARGE_PARAMETER_EXAMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^###\s+Example\s+\d+:\s+_Using\s+large\s+parameter\s+set_.*?</details>\s*<p>")
        .expect("large parameter example pattern is valid")
});

fn h2_section(title: &str) -> Regex {
    Regex::new(&format!(r"(?ms)(^## {}.*?)^##\s", regex::escape(title)))
        .expect("section pattern is valid")
}

/// Sections pulled out of a module README
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadmeSections {
    pub resource_types: Option<String>,
    pub parameters: Option<String>,
    pub large_parameter_example: Option<String>,
}

impl ReadmeSections {
    /// Extract the Resource Types, Parameters and large parameter set example sections
    pub fn extract(content: &str) -> Self {
        Self {
            resource_types: resource_types(content),
            parameters: parameters(content),
            large_parameter_example: extract_large_parameter_example(content),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resource_types.is_none()
            && self.parameters.is_none()
            && self.large_parameter_example.is_none()
    }

    /// Join the found sections with a blank line: resource types, parameters, example
    pub fn to_markdown(&self) -> String {
        [
            &self.resource_types,
            &self.parameters,
            &self.large_parameter_example,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

/// Text matched by a level-two section pattern.
///
/// A section that is never followed by another level-two heading is not returned.
fn extract_h2_section(section: &Regex, content: &str) -> Option<String> {
    section
        .captures(content)
        .map(|cap| cap[1].trim().to_string())
}

pub fn resource_types(content: &str) -> Option<String> {
    extract_h2_section(&RESOURCE_TYPES, content)
}

pub fn parameters(content: &str) -> Option<String> {
    extract_h2_section(&PARAMETERS, content)
}

/// The `### Example N: _Using large parameter set_` block, closed by `</details>` and `<p>`
pub fn extract_large_parameter_example(content: &str) -> Option<String> {
    LARGE_PARAMETER_EXAMPLE
        .find(content)
        .map(|m| m.as_str().trim().to_string())
}
