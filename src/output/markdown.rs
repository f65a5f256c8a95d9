use crate::api::DiscoveryResult;
use crate::model::CodeElementRole;
use crate::output::{OutputFormatter, relative_path};
use std::io::Write;

/// Component catalogue as markdown, rendered with termimad on a terminal.
#[derive(Debug, Default)]
pub struct MarkdownOutput {
    /// Also list the types every finder run skipped.
    pub show_skipped: bool,
}

impl MarkdownOutput {
    pub fn new(show_skipped: bool) -> Self {
        Self { show_skipped }
    }
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, result: &DiscoveryResult, writer: &mut W) -> std::io::Result<()> {
        let container = &result.container;

        writeln!(writer, "# Components: {}\n", container.name)?;
        if !container.description.is_empty() {
            writeln!(writer, "{}\n", container.description)?;
        }
        writeln!(
            writer,
            "{} components and {} relationships, from {} types in {} files.\n",
            container.components().len(),
            container.relationship_count(),
            result.types,
            result.files
        )?;

        if container.components().is_empty() {
            writeln!(writer, "No components found.")?;
        }

        for component in container.components() {
            writeln!(writer, "## {}\n", component.name)?;

            let mut facts = vec![format!("`{}`", component.type_name)];
            if !component.technology.is_empty() {
                facts.push(format!("*{}*", component.technology));
            }
            writeln!(writer, "{}\n", facts.join(" · "))?;

            if !component.description.is_empty() {
                writeln!(writer, "> {}\n", component.description)?;
            }

            let supporting: Vec<_> = component
                .code()
                .iter()
                .filter(|c| c.role == CodeElementRole::Supporting)
                .collect();
            if !supporting.is_empty() {
                writeln!(writer, "**Code**\n")?;
                for element in supporting {
                    writeln!(writer, "- `{}`", element.type_name)?;
                }
                writeln!(writer)?;
            }

            if !component.relationships().is_empty() {
                writeln!(writer, "**Uses**\n")?;
                for relationship in component.relationships() {
                    let destination = &container[relationship.destination];
                    writeln!(
                        writer,
                        "- {} (`{}`): {}",
                        destination.name, destination.type_name, relationship.description
                    )?;
                }
                writeln!(writer)?;
            }
        }

        let cycles = container.cycles();
        if !cycles.is_empty() {
            writeln!(writer, "## 🔴 Dependency Cycles\n")?;
            for cycle in cycles {
                let mut names: Vec<_> = cycle.iter().map(|id| container[*id].name.as_str()).collect();
                if let Some(first) = names.first().copied() {
                    names.push(first);
                }
                writeln!(writer, "- {}", names.join(" → "))?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "## Finder Runs\n")?;
        for report in &result.reports {
            let scope = if report.scope.is_empty() {
                "(all types)"
            } else {
                report.scope.as_str()
            };
            writeln!(
                writer,
                "- `{}` over `{}`: {} components ({} new), {} supporting types, {} relationships added",
                report.strategy,
                scope,
                report.components.len(),
                report.created,
                report.code_elements_added,
                report.relationships_added
            )?;
        }
        writeln!(writer)?;

        let skipped: Vec<_> = result.reports.iter().flat_map(|r| &r.skipped).collect();
        if self.show_skipped && !skipped.is_empty() {
            writeln!(writer, "## Skipped Types\n")?;
            for skip in skipped {
                writeln!(writer, "- `{}`: {}", skip.type_name, skip.reason)?;
            }
            writeln!(writer)?;
        }

        if !result.failures.is_empty() {
            writeln!(writer, "## 🟡 Unparsed Files\n")?;
            for failure in &result.failures {
                writeln!(
                    writer,
                    "- `{}`: {}",
                    relative_path(&failure.path, &result.root),
                    failure.error
                )?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finder::{
        ComponentFinder, NameSuffixTypeMatcher, TypeBasedComponentFinderStrategy,
    };
    use crate::model::Container;
    use crate::repository::{InMemoryTypeRepository, TypeInfo};
    use std::path::PathBuf;

    fn result() -> DiscoveryResult {
        let repo = InMemoryTypeRepository::builder()
            .with_type(TypeInfo::class("app.AComponent").references("app.BComponent"))
            .with_type(TypeInfo::class("app.BComponent").references("app.AComponent"))
            .with_type(TypeInfo::class("app.CComponent").references("app.Missing"))
            .build();
        let mut container = Container::new("Shop", "Sells things", "Java");
        let finder = ComponentFinder::new(
            &repo,
            "app",
            TypeBasedComponentFinderStrategy::new(
                NameSuffixTypeMatcher::new("Component").with_technology("POJO"),
            ),
        )
        .unwrap();
        let report = finder.find_components(&mut container);

        DiscoveryResult {
            root: PathBuf::from("/project"),
            container,
            reports: vec![report],
            files: 3,
            types: 3,
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_markdown_lists_components_relationships_and_cycles() {
        let mut buffer = Vec::new();
        MarkdownOutput::new(false)
            .format(&result(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("# Components: Shop"));
        assert!(text.contains("3 components and 2 relationships"));
        assert!(text.contains("## AComponent"));
        assert!(text.contains("`app.AComponent` · *POJO*"));
        assert!(text.contains("- BComponent (`app.BComponent`): Uses"));
        assert!(text.contains("- AComponent → BComponent → AComponent"));
        assert!(text.contains("- `type` over `app`: 3 components (3 new)"));
        assert!(!text.contains("Skipped Types"));
    }

    #[test]
    fn test_markdown_empty_container() {
        let mut result = result();
        result.container = Container::new("Empty", "", "");
        result.reports.clear();

        let mut buffer = Vec::new();
        MarkdownOutput::default()
            .format(&result, &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.contains("No components found."));
        assert!(!text.contains("Dependency Cycles"));
    }
}
