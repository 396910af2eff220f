//! Prompt templates and canned replies.
//!
//! Evidence handed to the citation prompts is a list of numbered blocks
//! (`[1] title / source / snippet`); answers cite them as `[来源: 1]` or
//! `[来源: 1,3]`. Templates use `{name}` placeholders filled by the render
//! functions below in a single pass, so placeholder-like text inside the
//! question, evidence, or answer is copied through untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").ok());

pub const SYSTEM_MESSAGE: &str = "你是 Construct 3 游戏引擎专家助手。

能力范围：
1. 回答 Construct 3 使用问题
2. 解释插件、行为、系统对象动作/条件的用法（以参考资料为准）
3. 提供事件表编写建议与示例（可执行、可落地）

规则（必须遵守）：
- 只要问题依赖\"文档事实\"，就必须以检索到的参考资料为依据；没找到就直说\"文档中未找到相关信息\"
- 不要编造 Construct 3 的菜单项、条件、动作、插件名称或版本差异
- 回答要清晰、可操作；必要时给最小可复现/最小可用示例
";

pub const STRICT_QA_PROMPT: &str = "你是 Construct 3 游戏引擎专家。你必须严格遵守以下铁律：

## 铁律（违反则回答无效）
1. **只使用【参考资料】中的信息** - 其他一概不知，不要推测
2. **每个事实性陈述后必须标注 [来源: N]** - 没有引用=捏造
3. **遇到不确定的，明确说\"文档未提及\"** - 绝不能猜测

## 参考资料（按重要性排序）
{context}

## 用户问题
{question}

## 输出格式（严格遵守）
- **事实性信息**：`[来源: 1]` 或 `[来源: 1,3]`
- **通用经验/推测**：`[通用经验]`（必须明确标注，不能假装是事实）
- **不知道**：`直接说\"文档未找到相关信息\"`

## 禁止行为
- 不要添加参考资料中没有的细节
- 不要编造菜单项、参数名、版本差异
- 不要用\"可能/大概/或许\"来填充内容

请回答（每句话都要有来源）：";

pub const LOW_RELEVANCE_PROMPT: &str = "你是 Construct 3 游戏引擎专家助手。只能根据【参考资料】回答。

## 参考资料（每条带编号，便于引用）
{context}

## 用户问题
{question}

## 注意事项
检索到的相关资料较少（仅 {result_count} 条），请：
1. 仅根据参考资料中明确提到的内容回答；不要用“可能/大概”堆砌结论
2. 对于不确定的部分，明确说明“文档中未找到相关信息”
3. 可以提供一般性建议，但必须标注这是“通用经验”，并且不要冒充官方文档结论
4. 每个关键结论后用 [来源: x] 标注引用编号；通用经验用 [通用经验] 标注

请回答：";

pub const NO_RESULTS_RESPONSE: &str = "抱歉，我没有在 Construct 3 文档中找到与您问题直接相关的内容。

可能原因：
1. 问题表述方式与文档用语不同
2. 该功能在文档中使用了不同的术语或属于插件/第三方扩展
3. 问题可能不属于 Construct 3 范围

建议：
1. 换一组关键词重新提问（可尝试中英混合）
2. 提供更多上下文（你想实现的具体效果、对象类型、是否使用某插件/行为、当前平台）
3. 给出你参考的文档页面/截图/事件表片段，我可以基于它继续检索与定位
";

pub const EVENT_GENERATION_PROMPT: &str = "你是 Construct 3 事件表生成专家。请优先参考【类似示例项目】中的写法与能力范围。

## 类似示例项目（可引用，每条带编号）
{similar_examples}

## 用户需求
{user_requirement}

## 生成要求（必须遵守）
1. 输出“可直接照抄”的事件表结构：分组/注释/条件/动作清晰
2. 只使用在示例中出现过的对象类型/行为/系统动作；如果需要未出现的能力，必须写“假设：需要插件/行为 X”，并给替代方案
3. 给出：
   - 对象清单（对象类型 + 是否需要行为/插件）
   - 变量清单（全局/实例，命名建议）
   - 关键事件组（实现核心路径）
4. 事件表要最小可用：先实现核心路径，再给可选增强
5. 末尾加“依赖说明”：哪些地方来自示例 [来源:x]，哪些是通用建议 [通用经验]

事件表代码：";

pub const QUERY_REWRITE_PROMPT: &str = "你是搜索查询优化专家。用户在搜索 Construct 3 相关内容。

原始查询: {original_query}

生成 3 条查询（必须满足）：
- 至少 1 条中文
- 至少 1 条纯英文
- 至少 1 条中英混合
- 尽量包含对象/行为/事件表关键词（Sprite, Event sheet, Behavior, Instance variable 等）

每行一个查询，不要编号或解释：";

pub const QUERY_DECOMPOSE_PROMPT: &str = "你是 Construct 3 查询拆解专家。用户的问题包含多个步骤或多个子目标。

原始问题: {original_query}

把它拆成 2-4 个可以独立检索的子问题（必须满足）：
- 每个子问题只关注一个对象、行为或事件表环节
- 保留原问题中的 Construct 3 术语（Sprite, Behavior, Event sheet 等）
- 按实现顺序排列

每行一个子问题，不要解释：";

pub const SELF_REFLECTION_PROMPT: &str = "你是 Construct 3 事实核查员。检查以下回答是否可靠：

## 原始问题
{question}

## 初始回答
{answer}

## 参考资料
{source_context}

## 检查清单
1. 所有 [来源: N] 引用是否真实存在于参考资料中？
2. 回答中是否有参考资料未提及的\"事实\"？
3. 哪些是明确事实，哪些是推测/通用经验？

## 输出要求
仔细对比回答和参考资料，只输出一个 JSON 对象，不要有其他解释：

{\"reliable\": true 或 false, \"issues\": [\"捏造或无来源的声明\", \"...\"], \"corrected_answer\": \"不可靠时给出修正后的回答，可靠时为 null\"}";

/// Opening line of the chat-path reference section.
pub const CHAT_CONTEXT_HEADING: &str = "## 参考资料";

pub const VECTOR_STORE_UNAVAILABLE_MESSAGE: &str = "抱歉，文档检索服务（Qdrant）当前不可用，暂时无法查询 Construct 3 文档。

请确认向量数据库已启动后重试。";

pub const LANGUAGE_MODEL_UNAVAILABLE_MESSAGE: &str =
    "语言模型服务当前不可用，无法生成回答。以下是检索到的相关资料，可直接参考：";

/// Final chunk of a stream whose generation broke off part way.
pub const GENERATION_INTERRUPTED_NOTICE: &str = "

---
（生成中断：回答不完整，请重试。）";

pub const LOW_CONFIDENCE_DISCLAIMER: &str = "

---
注意：此回答未通过自动事实核查，部分内容可能缺少文档依据，请以官方文档为准。";

/// Substitute every known `{name}` in one left-to-right scan. Unknown
/// placeholders (and literal JSON braces) stay as written.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let Some(re) = PLACEHOLDER.as_ref() else {
        return values
            .iter()
            .fold(template.to_string(), |acc, (name, value)| {
                acc.replace(&format!("{{{name}}}"), value)
            });
    };
    re.replace_all(template, |caps: &Captures| {
        values
            .iter()
            .find(|(name, _)| *name == &caps[1])
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

pub fn strict_qa(context: &str, question: &str) -> String {
    render(STRICT_QA_PROMPT, &[("context", context), ("question", question)])
}

pub fn low_relevance(context: &str, question: &str, result_count: usize) -> String {
    let count = result_count.to_string();
    render(
        LOW_RELEVANCE_PROMPT,
        &[
            ("context", context),
            ("question", question),
            ("result_count", count.as_str()),
        ],
    )
}

pub fn event_generation(similar_examples: &str, user_requirement: &str) -> String {
    render(
        EVENT_GENERATION_PROMPT,
        &[
            ("similar_examples", similar_examples),
            ("user_requirement", user_requirement),
        ],
    )
}

pub fn query_rewrite(original_query: &str) -> String {
    render(QUERY_REWRITE_PROMPT, &[("original_query", original_query)])
}

pub fn query_decompose(original_query: &str) -> String {
    render(QUERY_DECOMPOSE_PROMPT, &[("original_query", original_query)])
}

pub fn self_reflection(question: &str, answer: &str, source_context: &str) -> String {
    render(
        SELF_REFLECTION_PROMPT,
        &[
            ("question", question),
            ("answer", answer),
            ("source_context", source_context),
        ],
    )
}

pub fn chat_system(context: &str) -> String {
    format!("{SYSTEM_MESSAGE}\n\n{CHAT_CONTEXT_HEADING}\n{context}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_leave_no_placeholders() {
        for rendered in [
            strict_qa("[1] title: Sprite", "Sprite 是什么"),
            low_relevance("[1] title: Sprite", "Sprite 是什么", 2),
            event_generation("### [1] demo", "生成跳跃"),
            query_rewrite("跳跃"),
            query_decompose("跳跃然后射击"),
            self_reflection("q", "a", "[1] title: -"),
        ] {
            assert!(!rendered.contains("{context}"));
            assert!(!rendered.contains("{question}"));
            assert!(!rendered.contains("{answer}"));
            assert!(!rendered.contains("{original_query}"));
        }
        assert!(low_relevance("c", "q", 2).contains("仅 2 条"));
    }

    #[test]
    fn inserted_text_is_not_substituted_again() {
        let evidence = "[1] title: 脚本\n    snippet: const s = `${answer} {question}`;";
        let rendered = self_reflection("what is {answer}?", "ANSWER_TEXT", evidence);
        assert!(rendered.contains("## 原始问题\nwhat is {answer}?"));
        assert!(rendered.contains("## 初始回答\nANSWER_TEXT"));
        assert!(rendered.contains("const s = `${answer} {question}`;"));
        assert_eq!(rendered.matches("ANSWER_TEXT").count(), 1);

        let qa = strict_qa(evidence, "Q {context}");
        assert!(qa.contains("const s = `${answer} {question}`;"));
        assert!(qa.contains("## 用户问题\nQ {context}"));
        assert!(low_relevance(evidence, "Q", 1).contains("`${answer} {question}`"));
    }

    #[test]
    fn reflection_json_example_survives_rendering() {
        let rendered = self_reflection("q", "a", "[1] title: -");
        assert!(rendered.contains("{\"reliable\": true 或 false"));
    }

    #[test]
    fn chat_system_appends_reference_section() {
        let s = chat_system("## 插件参考\n...");
        assert!(s.starts_with(SYSTEM_MESSAGE));
        assert!(s.contains("## 参考资料\n## 插件参考"));
    }
}
