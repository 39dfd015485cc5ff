use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of capability a plugin can provide.
///
/// The discriminant doubles as a dense table index and as the settings
/// group under which enabled state is persisted, so the order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Tool = 0,
    Extension = 1,
    Engine = 2,
    Color = 3,
}

impl Category {
    /// Number of categories, used to size category-indexed tables.
    pub const COUNT: usize = 4;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Tool,
        Category::Extension,
        Category::Engine,
        Category::Color,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name of the directory scanned for this category under every
    /// search path.
    pub fn subdirectory(self) -> &'static str {
        match self {
            Category::Tool => "tools",
            Category::Extension => "extensions",
            Category::Engine => "engines",
            Category::Color => "colors",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Tool => "Tool",
            Category::Extension => "Extension",
            Category::Engine => "Engine",
            Category::Color => "Color",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "tool" | "tools" => Some(Category::Tool),
            "extension" | "extensions" => Some(Category::Extension),
            "engine" | "engines" => Some(Category::Engine),
            "color" | "colors" | "colour" | "colours" => Some(Category::Color),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn indices_are_dense_and_stable() {
        for (position, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), position);
            assert_eq!(Category::from_index(position), Some(*category));
        }
        assert_eq!(Category::from_index(Category::COUNT), None);
    }

    #[test]
    fn parse_accepts_directory_names() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.subdirectory()), Some(category));
        }
        assert_eq!(Category::parse("widget"), None);
    }
}
