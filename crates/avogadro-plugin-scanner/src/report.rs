use std::fmt::Write;

use avogadro_plugin_manager::sdk::Category;
use avogadro_plugin_manager::PluginManager;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginRow {
    pub category: Category,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    /// Module file name; `None` for plugins linked into the host.
    pub file: Option<String>,
}

/// Enabled plugins in discovery order, then disabled ones, per category.
pub fn plugin_rows(manager: &mut PluginManager, categories: &[Category]) -> Vec<PluginRow> {
    let mut rows = Vec::new();
    for &category in categories {
        let descriptors = manager.plugin_descriptors(category).to_vec();
        for factory in manager.factories(category) {
            let file = descriptors
                .iter()
                .find(|descriptor| descriptor.is_enabled() && descriptor.name() == factory.name())
                .map(|descriptor| descriptor.file_name().to_string());
            rows.push(PluginRow {
                category,
                name: factory.name().to_string(),
                description: factory.description().to_string(),
                enabled: true,
                file,
            });
        }
        rows.extend(
            descriptors
                .iter()
                .filter(|descriptor| !descriptor.is_enabled())
                .map(|descriptor| PluginRow {
                    category,
                    name: descriptor.name().to_string(),
                    description: descriptor.description().to_string(),
                    enabled: false,
                    file: Some(descriptor.file_name().to_string()),
                }),
        );
    }
    rows
}

pub fn render_rows(rows: &[PluginRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let status = if row.enabled { "enabled" } else { "disabled" };
        let origin = row.file.as_deref().unwrap_or("builtin");
        let _ = writeln!(
            out,
            "{:<9} {:<8} {} [{}]",
            row.category.label(),
            status,
            row.name,
            origin
        );
    }
    out
}
