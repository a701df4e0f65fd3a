//! Boot sequence
//!
//! Runs once per page, in a fixed order:
//!
//! 1. classify the network profile
//! 2. inject the boot stylesheet
//! 3. move critical style blocks to the front of `head`
//! 4. select slow source variants
//! 5. defer engine setup to an idle period, or a short delay when the
//!    platform has no idle callbacks

use super::profile::{classify, NetworkProfile};
use super::selector::apply_slow_variants;
use crate::config::{EngineSettings, LazyConfig};
use crate::dom::{Document, NodeId};
use crate::page::PageContext;
use crate::platform::{Environment, Resume, Task};

/// Id of the injected stylesheet
pub const BOOT_STYLE_ID: &str = "lazyboot-style";

/// Marker on style blocks that belong at the front of `head`
pub const CRITICAL_ATTRIBUTE: &str = "critical";

const MEDIA_HINTS: &str = "img[data-src],img[data-srcset],picture,iframe[data-src],video,[data-bg]\
{content-visibility:auto;contain-intrinsic-size:auto 300px}\
img,video,iframe{will-change:transform;backface-visibility:hidden}";

const SMOOTH_SCROLL: &str = "html{scroll-behavior:smooth}";

/// What a successful boot produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootReport {
    pub profile: NetworkProfile,
    /// Settings the engine must be created with
    pub settings: EngineSettings,
    /// When the engine setup task resumes
    pub setup_at: Resume,
    pub critical_styles: usize,
    pub slow_variants: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BootOutcome {
    Booted(BootReport),
    /// The page was booted before; nothing was done
    AlreadyBooted,
}

/// One-shot page initialisation
#[derive(Debug)]
pub struct BootSequencer {
    config: LazyConfig,
    booted: bool,
}

impl BootSequencer {
    pub fn new(config: LazyConfig) -> Self {
        Self {
            config,
            booted: false,
        }
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn boot(&mut self, ctx: &mut PageContext<'_>, environment: &Environment) -> BootOutcome {
        if self.booted {
            log::warn!("page already booted, ignoring");
            return BootOutcome::AlreadyBooted;
        }
        self.booted = true;

        let profile = classify(environment.connection.as_ref(), environment.prefers_reduced_motion);
        log::info!(
            "booting: connection {}, slow {}, save-data {}",
            profile.effective_type.as_str(),
            profile.is_slow,
            profile.save_data_requested
        );

        if self.config.inject_styles {
            inject_stylesheet(ctx.document, &profile);
        }
        let critical_styles = relocate_critical_styles(ctx.document);
        let slow_variants = apply_slow_variants(ctx.document, &profile);

        let setup_at = if ctx.capabilities.idle_callback {
            Resume::Idle {
                timeout_ms: self.config.idle_timeout_ms,
            }
        } else {
            Resume::Delay {
                ms: self.config.fallback_delay_ms,
            }
        };
        ctx.scheduler.schedule(Task::EngineSetup, setup_at);

        BootOutcome::Booted(BootReport {
            profile,
            settings: self.config.tuning(&profile),
            setup_at,
            critical_styles,
            slow_variants,
        })
    }
}

/// The boot stylesheet text for this profile
pub fn boot_stylesheet(profile: &NetworkProfile) -> String {
    let mut css = String::from(MEDIA_HINTS);
    if !profile.prefers_reduced_motion {
        css.push_str(SMOOTH_SCROLL);
    }
    css
}

/// Append the boot stylesheet to `head`. Returns false when it is already
/// present or the document has no `head`.
pub fn inject_stylesheet(document: &mut Document, profile: &NetworkProfile) -> bool {
    if document.get_element_by_id(BOOT_STYLE_ID).is_some() {
        return false;
    }
    let Some(head) = document.head() else {
        log::warn!("no head element, boot stylesheet not injected");
        return false;
    };

    let style = document.create_element("style");
    document.set_attribute(style, "id", BOOT_STYLE_ID);
    let text = document.create_text(boot_stylesheet(profile));
    document.append_child(style, text);
    document.append_child(head, style);
    true
}

/// Move every `style[critical]` to the front of `head` in document order,
/// dropping the marker. Each block lands before the previous one, so the
/// final order is reversed.
pub fn relocate_critical_styles(document: &mut Document) -> usize {
    let Some(head) = document.head() else {
        log::debug!("no head element, critical styles left in place");
        return 0;
    };

    let blocks: Vec<NodeId> = document
        .elements_with_attribute(CRITICAL_ATTRIBUTE)
        .into_iter()
        .filter(|node| document.tag_name(*node) == Some("style"))
        .collect();

    for block in &blocks {
        document.remove_attribute(*block, CRITICAL_ATTRIBUTE);
        document.prepend_child(head, *block);
    }
    if !blocks.is_empty() {
        log::debug!("relocated {} critical style blocks", blocks.len());
    }
    blocks.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{HtmlParser, Viewport};
    use crate::platform::{
        Capabilities, ConnectionInfo, EffectiveType, ListenerRegistry, RecordingMediaHost,
        Scheduler,
    };
    use pretty_assertions::assert_eq;

    struct Harness {
        document: Document,
        listeners: ListenerRegistry,
        scheduler: Scheduler,
        media: RecordingMediaHost,
        capabilities: Capabilities,
    }

    impl Harness {
        fn new(html: &str, capabilities: Capabilities) -> Self {
            Self {
                document: HtmlParser::new().parse(html).unwrap(),
                listeners: ListenerRegistry::new(),
                scheduler: Scheduler::new(),
                media: RecordingMediaHost::new(),
                capabilities,
            }
        }

        fn boot(&mut self, sequencer: &mut BootSequencer, environment: &Environment) -> BootOutcome {
            let mut ctx = PageContext {
                document: &mut self.document,
                viewport: Viewport::default(),
                listeners: &mut self.listeners,
                scheduler: &mut self.scheduler,
                media: &mut self.media,
                capabilities: self.capabilities,
            };
            sequencer.boot(&mut ctx, environment)
        }
    }

    fn head_styles(doc: &Document) -> Vec<String> {
        let head = doc.head().unwrap();
        doc.children(head)
            .iter()
            .filter(|c| doc.tag_name(**c) == Some("style"))
            .map(|c| doc.text_content(*c))
            .collect()
    }

    #[test]
    fn test_critical_styles_reversed_at_head_front() {
        let mut doc = HtmlParser::new()
            .parse(
                r#"<html><head><title>t</title><style>main</style></head>
                <body><style critical>S1</style><p>x</p><style critical="">S2</style>
                <style critical>S3</style></body></html>"#,
            )
            .unwrap();
        assert_eq!(relocate_critical_styles(&mut doc), 3);

        let head = doc.head().unwrap();
        let first: Vec<String> = doc.children(head)[..3]
            .iter()
            .map(|c| doc.text_content(*c))
            .collect();
        assert_eq!(first, vec!["S3", "S2", "S1"]);
        assert!(doc.elements_with_attribute(CRITICAL_ATTRIBUTE).is_empty());
        assert_eq!(head_styles(&doc), vec!["S3", "S2", "S1", "main"]);
    }

    #[test]
    fn test_stylesheet_respects_reduced_motion() {
        let mut profile = NetworkProfile::default();
        assert!(boot_stylesheet(&profile).contains("scroll-behavior:smooth"));
        profile.prefers_reduced_motion = true;
        let css = boot_stylesheet(&profile);
        assert!(!css.contains("scroll-behavior"));
        assert!(css.contains("content-visibility:auto"));
    }

    #[test]
    fn test_boot_order_and_idle_deferral() {
        let mut h = Harness::new(
            r#"<head><style critical>crit</style></head><body><img data-src="a.jpg" data-src-slow="a-small.jpg"></body>"#,
            Capabilities::modern(),
        );
        let environment = Environment {
            connection: Some(ConnectionInfo {
                effective_type: EffectiveType::TwoG,
                save_data: false,
            }),
            ..Environment::default()
        };
        let mut sequencer = BootSequencer::new(LazyConfig::default());

        let BootOutcome::Booted(report) = h.boot(&mut sequencer, &environment) else {
            panic!("first boot refused");
        };
        assert!(report.profile.is_slow);
        assert_eq!(report.settings.root_margin, 150.0);
        assert_eq!(report.critical_styles, 1);
        assert_eq!(report.slow_variants, 1);
        assert_eq!(report.setup_at, Resume::Idle { timeout_ms: 2000 });

        // Critical block ahead of the injected stylesheet
        let head = h.document.head().unwrap();
        let children = h.document.children(head).to_vec();
        assert_eq!(h.document.text_content(children[0]), "crit");
        assert_eq!(
            h.document.get_attribute(children[1], "id"),
            Some(BOOT_STYLE_ID)
        );

        let img = h.document.elements_by_tag_name("img")[0];
        assert_eq!(h.document.get_attribute(img, "data-src"), Some("a-small.jpg"));
        assert!(h.scheduler.is_scheduled(Task::EngineSetup));
    }

    #[test]
    fn test_boot_without_idle_callbacks_uses_delay() {
        let mut h = Harness::new("<p>x</p>", Capabilities::legacy());
        let mut sequencer = BootSequencer::new(LazyConfig::default());
        let BootOutcome::Booted(report) = h.boot(&mut sequencer, &Environment::default()) else {
            panic!("first boot refused");
        };
        assert_eq!(report.setup_at, Resume::Delay { ms: 1 });
        assert_eq!(h.scheduler.advance(1), vec![Task::EngineSetup]);
    }

    #[test]
    fn test_second_boot_is_refused() {
        let mut h = Harness::new("<p>x</p>", Capabilities::modern());
        let mut sequencer = BootSequencer::new(LazyConfig::default());
        h.boot(&mut sequencer, &Environment::default());
        assert_eq!(
            h.boot(&mut sequencer, &Environment::default()),
            BootOutcome::AlreadyBooted
        );
        assert_eq!(h.scheduler.pending(), 1);
        assert_eq!(h.document.elements_by_tag_name("style").len(), 1);
    }

    #[test]
    fn test_stylesheet_injected_once_per_document() {
        let mut doc = HtmlParser::new().parse("<p>x</p>").unwrap();
        assert!(inject_stylesheet(&mut doc, &NetworkProfile::default()));
        assert!(!inject_stylesheet(&mut doc, &NetworkProfile::default()));
        assert_eq!(doc.elements_by_tag_name("style").len(), 1);
    }

    #[test]
    fn test_injection_can_be_disabled() {
        let mut h = Harness::new("<p>x</p>", Capabilities::modern());
        let config = LazyConfig {
            inject_styles: false,
            ..LazyConfig::default()
        };
        h.boot(&mut BootSequencer::new(config), &Environment::default());
        assert!(h.document.get_element_by_id(BOOT_STYLE_ID).is_none());
    }
}
