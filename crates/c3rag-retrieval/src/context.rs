//! Render retrieved evidence as prompt text.

use c3rag_core::models::SearchResult;
use c3rag_core::partitions::{PartitionRegistry, EXAMPLES, TERMS};

use crate::search::PartitionResults;

/// `plugin-reference/sprite.md` + heading `动画` → `[plugin-reference > sprite > 动画]`.
fn breadcrumb(result: &SearchResult) -> String {
    let source = result.meta_str("source");
    let path = source.strip_suffix(".md").unwrap_or(source);
    let mut header = format!("[{}", path.replace('/', " > "));
    let h2 = result.meta_str("h2_heading");
    if !h2.is_empty() {
        header.push_str(" > ");
        header.push_str(h2);
    }
    header.push(']');
    header
}

fn section_title<'a>(registry: &'a PartitionRegistry, key: &'a str) -> &'a str {
    registry
        .get(key)
        .map(|p| p.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(key)
}

/// Grouped context for the chat path: every document partition in registry
/// order with breadcrumbs, then a glossary of term pairs, then example
/// snippets labeled by project.
pub fn format_context(results: &PartitionResults, registry: &PartitionRegistry) -> String {
    let mut parts: Vec<String> = Vec::new();

    let doc_keys = registry
        .iter()
        .map(|p| p.key.as_str())
        .filter(|key| *key != TERMS && *key != EXAMPLES);
    for key in doc_keys {
        let Some(items) = results.get(key).filter(|items| !items.is_empty()) else {
            continue;
        };
        parts.push(format!("\n### {}\n", section_title(registry, key)));
        for r in items {
            parts.push(format!(
                "{}\n{}\n来源: {}\n",
                breadcrumb(r),
                r.text,
                r.meta_str("source")
            ));
        }
    }

    if let Some(terms) = results.get(TERMS).filter(|items| !items.is_empty()) {
        parts.push(format!("\n### {}\n", section_title(registry, TERMS)));
        for r in terms {
            parts.push(format!("- {} = {}", r.meta_str("zh"), r.meta_str("en")));
        }
    }

    if let Some(examples) = results.get(EXAMPLES).filter(|items| !items.is_empty()) {
        parts.push(format!("\n### {}\n", section_title(registry, EXAMPLES)));
        for r in examples {
            let project = match r.meta_str("project") {
                "" => "unknown",
                p => p,
            };
            parts.push(format!("[项目: {project}]\n{}\n", r.text));
        }
    }

    parts.join("\n")
}

/// Numbered, citable evidence blocks. Block `n` is the `n`-th result, so
/// `[来源: n]` in an answer maps to `sources[n - 1]`.
pub fn format_evidence_blocks(results: &[SearchResult], registry: &PartitionRegistry) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(results.len() * 3);
    for (i, r) in results.iter().enumerate() {
        let title = match r.meta_str("h2_heading").trim() {
            "" => registry
                .by_collection(&r.source)
                .map(|p| p.title.as_str())
                .unwrap_or(""),
            heading => heading,
        };
        let source = match r.meta_str("source").trim() {
            "" => r.source.as_str(),
            s => s,
        };
        let dash = |s: &str| if s.trim().is_empty() { "-".to_string() } else { s.trim().to_string() };
        lines.push(format!("[{}] title: {}", i + 1, dash(title)));
        lines.push(format!("    source: {}", dash(source)));
        lines.push(format!("    snippet: {}", dash(&r.text)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use c3rag_core::partitions::{default_partitions, Partition, GUIDE, PLUGINS};

    use super::*;

    fn registry() -> PartitionRegistry {
        PartitionRegistry::new(default_partitions())
    }

    #[test]
    fn sections_follow_registry_order_with_breadcrumbs() {
        let mut pr = PartitionResults::new();
        pr.insert(
            PLUGINS,
            vec![SearchResult::new("Sprite 可以播放动画", 0.8, "c3_plugins")
                .with_metadata("source", "plugin-reference/sprite.md")
                .with_metadata("h2_heading", "动画")],
        );
        pr.insert(
            GUIDE,
            vec![SearchResult::new("入门", 0.7, "c3_guide").with_metadata("source", "guide/intro.md")],
        );
        pr.insert(
            TERMS,
            vec![SearchResult::new("", 0.9, "c3_terms")
                .with_metadata("zh", "精灵")
                .with_metadata("en", "Sprite")],
        );
        pr.insert(EXAMPLES, vec![SearchResult::new("{\"events\":[]}", 0.6, "c3_examples")]);

        let ctx = format_context(&pr, &registry());
        let guide = ctx.find("### 入门指南").unwrap();
        let plugins = ctx.find("### 插件参考").unwrap();
        let terms = ctx.find("### 术语表").unwrap();
        let examples = ctx.find("### 示例代码").unwrap();
        assert!(guide < plugins && plugins < terms && terms < examples);
        assert!(ctx.contains("[plugin-reference > sprite > 动画]"));
        assert!(ctx.contains("来源: plugin-reference/sprite.md"));
        assert!(ctx.contains("- 精灵 = Sprite"));
        assert!(ctx.contains("[项目: unknown]"));
    }

    #[test]
    fn configured_partitions_get_their_own_section() {
        let mut partitions = default_partitions();
        partitions.insert(
            1,
            Partition::new("tutorials", "c3_tutorials", "社区教程", "社区教程"),
        );
        let registry = PartitionRegistry::new(partitions);

        let mut pr = PartitionResults::new();
        pr.insert(
            "tutorials",
            vec![SearchResult::new("用 Tween 做弹跳", 0.8, "c3_tutorials")
                .with_metadata("source", "tutorials/bounce.md")],
        );
        pr.insert(
            GUIDE,
            vec![SearchResult::new("入门", 0.7, "c3_guide").with_metadata("source", "guide/intro.md")],
        );

        let ctx = format_context(&pr, &registry);
        let guide = ctx.find("### 入门指南").unwrap();
        let tutorials = ctx.find("### 社区教程").unwrap();
        assert!(guide < tutorials);
        assert!(ctx.contains("[tutorials > bounce]\n用 Tween 做弹跳"));
    }

    #[test]
    fn empty_results_render_empty_context() {
        assert_eq!(format_context(&PartitionResults::new(), &registry()), "");
    }

    #[test]
    fn evidence_blocks_are_numbered_from_one() {
        let results = vec![
            SearchResult::new("Tween 行为", 0.9, "c3_behaviors").with_metadata("h2_heading", "属性"),
            SearchResult::new("  ", 0.5, "c3_guide"),
        ];
        let blocks = format_evidence_blocks(&results, &registry());
        let lines: Vec<&str> = blocks.lines().collect();
        assert_eq!(lines[0], "[1] title: 属性");
        assert_eq!(lines[1], "    source: c3_behaviors");
        assert_eq!(lines[2], "    snippet: Tween 行为");
        assert_eq!(lines[3], "[2] title: 入门指南");
        assert_eq!(lines[5], "    snippet: -");
    }
}
