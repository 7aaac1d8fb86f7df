//! Command implementations. Each returns the text to print.

use anyhow::{bail, Context, Result};
use nuvens_app::{AppContext, NuvensConfig};
use nuvens_clouds::{CloudElement, CloudTransform, MotionStyle};
use nuvens_theme::{
    outline_color, KeyValueStore, MemoryStyleSheet, OutlineContext, OutlinePreset,
    PreferenceSource, OUTLINE_COLOR_VAR,
};
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(16);

/// Upper bound on frames spent waiting for transitions to finish
const MAX_SETTLE_FRAMES: u32 = 10_000;

/// A theme store bound to some storage, plus a sheet to render into
pub struct ThemeSession {
    ctx: AppContext,
    sheet: MemoryStyleSheet,
}

impl ThemeSession {
    pub fn new(config: NuvensConfig, storage: Box<dyn KeyValueStore>, system_dark: bool) -> Self {
        let sheet = config
            .theme
            .critical_selectors
            .iter()
            .fold(MemoryStyleSheet::new(), |sheet, selector| {
                sheet.with_elements(selector, 1)
            });
        Self {
            ctx: AppContext::bootstrap(config, storage, system_dark),
            sheet,
        }
    }

    pub fn show(self) -> String {
        let snapshot = self.ctx.theme().snapshot();
        let preference = snapshot.preference();
        let source = match preference.source {
            PreferenceSource::User => "user",
            PreferenceSource::System => "system",
        };
        format!(
            "theme: {}\nmode: {}\nsource: {}\nsystem: {}",
            snapshot.effective, snapshot.user, source, snapshot.system
        )
    }

    pub fn set(mut self, mode: &str) -> Result<String> {
        let theme = self
            .ctx
            .theme_mut()
            .set_theme(mode)
            .with_context(|| format!("Cannot set theme to {mode:?}"))?;
        self.saved()?;
        Ok(format!("theme: {theme}"))
    }

    pub fn toggle(mut self) -> Result<String> {
        let theme = self.ctx.theme_mut().toggle_theme();
        self.saved()?;
        Ok(format!("theme: {theme}"))
    }

    pub fn reset(mut self) -> Result<String> {
        let theme = self.ctx.theme_mut().reset_to_system();
        self.saved()?;
        Ok(format!("theme: {theme} (following system)"))
    }

    /// Run frames until every transition and the rehydration pass are done
    pub fn css(mut self) -> Result<String> {
        let mut now = Instant::now();
        let mut frames = 0;
        self.ctx.frame(now, &mut self.sheet);
        while !self.ctx.is_settled() {
            if frames == MAX_SETTLE_FRAMES {
                bail!("theme did not settle after {frames} frames");
            }
            now += FRAME;
            frames += 1;
            self.ctx.frame(now, &mut self.sheet);
        }
        tracing::debug!(frames, writes = self.sheet.writes(), "theme settled");

        let classes: Vec<&str> = self.sheet.classes().collect();
        Ok(format!(
            "/* {} */\n{}",
            classes.join(" "),
            self.sheet.to_css_block()
        ))
    }

    /// Outline declarations colored for the effective theme
    pub fn outline(self, preset: OutlinePreset, context: OutlineContext) -> String {
        let theme = self.ctx.theme().current_theme();
        format!(
            "{OUTLINE_COLOR_VAR}: {};\ntext-shadow: {};",
            outline_color(theme),
            preset.text_shadow(context)
        )
    }

    fn saved(&self) -> Result<()> {
        match self.ctx.theme().last_storage_error() {
            Some(e) => bail!("Failed to save theme preference: {e}"),
            None => Ok(()),
        }
    }
}

/// Parameters for [`run_clouds`]
#[derive(Debug, Clone)]
pub struct CloudRun {
    pub count: usize,
    pub frames: u32,
    pub seed: Option<u64>,
    pub style: Option<MotionStyle>,
    pub speed: Option<f32>,
}

/// Element that only remembers its last transform
struct Headless {
    transform: Option<CloudTransform>,
}

impl CloudElement for Headless {
    fn rendered_height(&self) -> f32 {
        64.0
    }

    fn apply_transform(&mut self, transform: &CloudTransform) {
        self.transform = Some(*transform);
    }
}

pub fn run_clouds(mut config: NuvensConfig, run: &CloudRun) -> Result<String> {
    if run.seed.is_some() {
        config.clouds.seed = run.seed;
    }
    let mut ctx = AppContext::bootstrap(
        config,
        Box::new(nuvens_theme::MemoryStorage::new()),
        false,
    );
    let mut sheet = MemoryStyleSheet::new();
    let mut now = Instant::now();

    if let Some(style) = run.style {
        ctx.clouds_mut().set_animation_style(style, now);
    }
    if let Some(speed) = run.speed {
        ctx.clouds_mut()
            .set_global_speed(speed, now)
            .context("Invalid --speed")?;
    }

    let elements: Vec<(String, Arc<Mutex<Headless>>)> = (1..=run.count)
        .map(|i| {
            (
                format!("cloud-{i}"),
                Arc::new(Mutex::new(Headless { transform: None })),
            )
        })
        .collect();
    for (id, element) in &elements {
        ctx.clouds_mut()
            .register_cloud(id, element, None, now)
            .with_context(|| format!("Failed to register {id}"))?;
    }

    for _ in 0..run.frames {
        now += FRAME;
        ctx.frame(now, &mut sheet);
    }

    let snapshot = ctx.clouds().snapshot();
    let mut out = format!(
        "style: {}  speed: {}  clouds: {}  frames: {}\n",
        snapshot.style, snapshot.global_speed, snapshot.cloud_count, run.frames
    );
    for (id, element) in &elements {
        let element = element.lock().unwrap_or_else(PoisonError::into_inner);
        let loops = ctx.clouds().loops_completed(id).unwrap_or(0);
        match element.transform {
            Some(transform) => {
                let _ = writeln!(out, "{id}: {transform}  loops: {loops}");
            }
            None => {
                let _ = writeln!(out, "{id}: not moved");
            }
        }
    }
    Ok(out.trim_end().to_string())
}
