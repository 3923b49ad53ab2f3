/// UI language for bundled content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Any `zh*` tag selects Chinese; everything else falls back to English
    pub fn from_tag(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("zh") {
            Locale::Zh
        } else {
            Locale::En
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

/// Starter content that replaces a document's title and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

/// Writing prompt inserted at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub key: &'static str,
    pub title: &'static str,
    pub content: &'static str,
}

const EN_TEMPLATES: &[Template] = &[
    Template {
        key: "brief",
        title: "Product Brief",
        description: "Outline positioning, goals, and next steps.",
        content: "<h2>Product Brief</h2><p>Summarize the product in one sentence.</p><h3>Goals</h3><ul><li></li><li></li></ul><h3>Key Differentiators</h3><ul><li></li><li></li></ul><h3>Next Steps</h3><p></p>",
    },
    Template {
        key: "meeting",
        title: "Meeting Notes",
        description: "Capture decisions and action items.",
        content: "<h2>Meeting Notes</h2><p><strong>Date:</strong> YYYY-MM-DD</p><p><strong>Attendees:</strong></p><h3>Highlights</h3><ul><li></li><li></li></ul><h3>Action Items</h3><ol><li></li><li></li></ol>",
    },
    Template {
        key: "blog",
        title: "Blog Outline",
        description: "Structure a long-form article quickly.",
        content: "<h2>Post Title</h2><p>Explain the topic and target audience.</p><h3>1. Context</h3><p></p><h3>2. Key Insights</h3><ul><li></li><li></li></ul><h3>3. Examples</h3><p></p><h3>4. Summary</h3><p></p>",
    },
];

const ZH_TEMPLATES: &[Template] = &[
    Template {
        key: "brief",
        title: "产品概览",
        description: "快速梳理产品定位与核心功能。",
        content: "<h2>产品概览</h2><p>一句话描述产品定位与目标用户。</p><h3>核心价值</h3><ul><li>解决的问题</li><li>核心差异化</li><li>关键指标</li></ul><h3>下一步</h3><p>列出近期要完成的行动项。</p>",
    },
    Template {
        key: "meeting",
        title: "会议纪要",
        description: "记录讨论要点与行动项。",
        content: "<h2>会议纪要</h2><p><strong>时间：</strong>YYYY-MM-DD</p><p><strong>参会人：</strong></p><h3>讨论要点</h3><ul><li></li><li></li></ul><h3>行动项</h3><ol><li></li><li></li></ol>",
    },
    Template {
        key: "blog",
        title: "文章大纲",
        description: "生成一篇长文结构。",
        content: "<h2>文章标题</h2><p>简要说明文章主题与受众。</p><h3>一、背景与问题</h3><p></p><h3>二、核心观点</h3><ul><li></li><li></li></ul><h3>三、案例与数据</h3><p></p><h3>四、结论与行动</h3><p></p>",
    },
];

const EN_PROMPTS: &[Prompt] = &[
    Prompt {
        key: "outline",
        title: "Generate outline",
        content: "Outline:\n- Context\n- Key insights\n- Next steps",
    },
    Prompt {
        key: "rewrite",
        title: "Polish paragraph",
        content: "Editing notes:\n1. Reduce redundancy\n2. Highlight the main point\n3. Align tone",
    },
    Prompt {
        key: "summary",
        title: "Create summary",
        content: "Summary: Add 2-3 sentences that capture the core message.",
    },
];

const ZH_PROMPTS: &[Prompt] = &[
    Prompt {
        key: "outline",
        title: "生成大纲",
        content: "请在这里补充：\n- 背景\n- 关键观点\n- 行动建议",
    },
    Prompt {
        key: "rewrite",
        title: "润色当前段落",
        content: "润色建议：\n1. 精简冗余\n2. 强化重点\n3. 统一语气",
    },
    Prompt {
        key: "summary",
        title: "生成摘要",
        content: "摘要：请在这里补充 2-3 句核心结论。",
    },
];

pub fn templates(locale: Locale) -> &'static [Template] {
    match locale {
        Locale::En => EN_TEMPLATES,
        Locale::Zh => ZH_TEMPLATES,
    }
}

pub fn prompts(locale: Locale) -> &'static [Prompt] {
    match locale {
        Locale::En => EN_PROMPTS,
        Locale::Zh => ZH_PROMPTS,
    }
}

pub fn find_template(locale: Locale, key: &str) -> Option<&'static Template> {
    templates(locale).iter().find(|t| t.key == key)
}

pub fn find_prompt(locale: Locale, key: &str) -> Option<&'static Prompt> {
    prompts(locale).iter().find(|p| p.key == key)
}
