use ansi_term::{Color, Style};
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

pub const DEFAULT: Style = Style {
    foreground: None,
    background: None,
    is_bold: false,
    is_dimmed: false,
    is_italic: false,
    is_underline: false,
    is_blink: false,
    is_reverse: false,
    is_hidden: false,
    is_strikethrough: false,
};

static ENABLED: AtomicBool = AtomicBool::new(true);

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Looks up a style by its dotted path. Unknown paths are unstyled.
pub fn get(name: &str) -> Style {
    STYLE_MAP.get(name).copied().unwrap_or(DEFAULT)
}

pub fn paint<T: Display>(name: &str, item: T) -> String {
    if ENABLED.load(Ordering::Relaxed) {
        get(name).paint(item.to_string()).to_string()
    } else {
        item.to_string()
    }
}

lazy_static::lazy_static! {
    pub static ref STYLE_MAP: HashMap<String, Style> = {
        let entries = &[
            ("comment", StyleNode::Base(Color::Cyan.normal())),
            ("comment.reason", StyleNode::Inherit(Overrides::default().dimmed(true))),
            ("header", StyleNode::Base(Color::White.bold())),
            ("keyword", StyleNode::Base(Color::Yellow.bold())),
            ("attribute", StyleNode::Base(Color::Purple.normal())),
            ("attribute.raw", StyleNode::Inherit(Overrides::fg(Some(Color::Red)))),

            ("type", StyleNode::Base(Color::Green.normal())),
            ("type.member", StyleNode::Inherit(Overrides::default().bold(true))),

            ("pool.index", StyleNode::Base(Color::Cyan.bold())),
            ("pool.tag", StyleNode::Base(Color::Blue.normal())),

            ("pool.val", StyleNode::Base(DEFAULT)),
            ("pool.val.number", StyleNode::Inherit(Overrides::default())),
            ("pool.val.string", StyleNode::Base(Color::Green.normal())),

            ("pool.ref", StyleNode::Base(DEFAULT)),
            ("pool.ref.member", StyleNode::Base(Color::Yellow.normal())),
            ("pool.ref.class", StyleNode::Inherit(Overrides::default())),
            ("pool.ref.other", StyleNode::Inherit(Overrides::default())),

            ("access", StyleNode::Base(Color::Yellow.normal())),
            ("access.unknown", StyleNode::Inherit(Overrides::fg(Some(Color::Red)))),

            ("flow.pc", StyleNode::Base(Color::Blue.normal())),
            ("flow.block", StyleNode::Base(Color::White.bold())),
            ("flow.branch.forward", StyleNode::Base(Color::Green.normal())),
            ("flow.branch.backward", StyleNode::Base(Color::Cyan.bold())),

            ("opcode.type", StyleNode::Base(Color::Cyan.normal())),
            ("opcode.type.load", StyleNode::Base(Color::Cyan.normal())),
            ("opcode.type.load.const", StyleNode::Inherit(Overrides::default().bold(true))),
            ("opcode.type.store", StyleNode::Base(Color::Cyan.normal())),

            ("opcode.type.stack", StyleNode::Base(Color::Yellow.normal())),
            ("opcode.type.object", StyleNode::Base(Color::Green.normal())),
            ("opcode.type.arith", StyleNode::Base(Color::Green.normal())),
            ("opcode.type.logic", StyleNode::Base(Color::Green.normal())),
            ("opcode.type.conversion", StyleNode::Base(Color::Green.normal())),

            ("opcode.type.flow", StyleNode::Base(Color::Yellow.normal().underline())),
            ("opcode.type.flow.invocation", StyleNode::Inherit(Overrides::default().underline(false))),

            ("opcode.immediate", StyleNode::Base(Color::Yellow.normal())),
            ("error", StyleNode::Base(Color::Red.bold())),
        ];

        let entries = entries.iter().map(|&(name, node)| (Cow::from(name), node)).collect::<HashMap<_, _>>();
        let mut resolved = HashMap::new();

        for path in entries.keys() {
            resolved.insert(path.clone().into(), compute_node(&entries, path).unwrap_or(DEFAULT));
        }

        resolved
    };
}

fn compute_node(ctx: &HashMap<Cow<'_, str>, StyleNode>, name: &str) -> Option<Style> {
    match *ctx.get(name)? {
        StyleNode::Base(style) => Some(style),
        StyleNode::Inherit(overrides) => {
            let (pos, _) = name.rmatch_indices('.').next()?;
            compute_node(ctx, &name[..pos]).map(|style| overrides.apply(style))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Overrides {
    pub foreground: Option<Option<Color>>,
    pub is_bold: Option<bool>,
    pub is_dimmed: Option<bool>,
    pub is_underline: Option<bool>,
}

impl Overrides {
    pub fn fg(color: Option<Color>) -> Self {
        Overrides {
            foreground: Some(color),
            ..Default::default()
        }
    }

    pub fn bold(self, bold: bool) -> Self {
        Overrides {
            is_bold: Some(bold),
            ..self
        }
    }

    pub fn dimmed(self, dimmed: bool) -> Self {
        Overrides {
            is_dimmed: Some(dimmed),
            ..self
        }
    }

    pub fn underline(self, underline: bool) -> Self {
        Overrides {
            is_underline: Some(underline),
            ..self
        }
    }

    fn apply(self, style: Style) -> Style {
        Style {
            foreground: self.foreground.unwrap_or(style.foreground),
            is_bold: self.is_bold.unwrap_or(style.is_bold),
            is_dimmed: self.is_dimmed.unwrap_or(style.is_dimmed),
            is_underline: self.is_underline.unwrap_or(style.is_underline),
            ..style
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StyleNode {
    Base(Style),
    Inherit(Overrides),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inherited_styles_resolve_through_parents() {
        let flow = get("opcode.type.flow");
        let invocation = get("opcode.type.flow.invocation");
        assert!(flow.is_underline);
        assert!(!invocation.is_underline);
        assert_eq!(invocation.foreground, flow.foreground);
        assert_eq!(get("comment.reason").foreground, Some(Color::Cyan));
        assert_eq!(get("no.such.style"), DEFAULT);
    }
}
