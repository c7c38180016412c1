use gix::progress::{Id, MessageLevel, Step, StepShared, Unit};
use gix::{Count, NestedProgress, Progress};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

const COUNT_TEMPLATE: &'static str = "⠁ {msg}: [{bar:20}] {pos}/{len}";
const BYTES_TEMPLATE: &'static str = "⠁ {msg}: [{bar:20}] {bytes}/{total_bytes}";

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}

/// Renders gix fetch and checkout progress as indicatif bars on stderr,
/// leaving stdout to the clone report.
pub struct IndicatifProgress {
    bars: Arc<MultiProgress>,
    bar: Option<ProgressBar>,
    children: HashMap<Id, ProgressBar>,
    id: Id,
    name: Option<String>,
    unit: Option<Unit>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            bars: Arc::new(MultiProgress::with_draw_target(target)),
            bar: None,
            children: HashMap::new(),
            id: gix::progress::UNKNOWN,
            name: None,
            unit: None,
        }
    }

    fn child(&mut self, name: String, id: Id) -> Self {
        let bar = self.bars.add(ProgressBar::new(0));
        bar.set_style(bar_style(COUNT_TEMPLATE));
        bar.set_message(name.clone());
        self.children.insert(id, bar.clone());

        Self {
            bars: self.bars.clone(),
            bar: Some(bar),
            children: HashMap::new(),
            id,
            name: Some(name),
            unit: None,
        }
    }
}

impl Count for IndicatifProgress {
    fn set(&self, step: Step) {
        if let Some(bar) = &self.bar {
            bar.set_position(step as u64);
        }
    }

    fn step(&self) -> Step {
        self.bar.as_ref().map(|bar| bar.position() as Step).unwrap_or(0)
    }

    fn inc_by(&self, step: Step) {
        if let Some(bar) = &self.bar {
            bar.inc(step as u64);
        }
    }

    fn counter(&self) -> StepShared {
        Arc::new(AtomicUsize::default())
    }
}

impl Progress for IndicatifProgress {
    fn init(&mut self, max: Option<Step>, unit: Option<Unit>) {
        let bar = self.bars.add(ProgressBar::new(max.unwrap_or(0) as u64));
        bar.set_style(bar_style(match unit {
            Some(_) => BYTES_TEMPLATE,
            None => COUNT_TEMPLATE,
        }));
        if let Some(name) = &self.name {
            bar.set_message(name.clone());
        }
        self.unit = unit;
        self.bar = Some(bar);
    }

    fn unit(&self) -> Option<Unit> {
        self.unit.clone()
    }

    fn max(&self) -> Option<Step> {
        self.bar
            .as_ref()
            .and_then(|bar| bar.length())
            .map(|len| len as Step)
    }

    fn set_max(&mut self, max: Option<Step>) -> Option<Step> {
        let bar = self.bar.as_ref()?;
        let previous = bar.length().map(|len| len as Step);
        bar.set_length(max.unwrap_or(0) as u64);
        previous
    }

    fn set_name(&mut self, name: String) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.clone());
        }
        self.name = Some(name);
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn id(&self) -> Id {
        self.id
    }

    fn message(&self, level: MessageLevel, message: String) {
        let line = match level {
            MessageLevel::Failure => format!("Error: {}", message),
            _ => message,
        };
        if self.bars.println(&line).is_err() {
            log::debug!("{}", line);
        }
    }
}

impl NestedProgress for IndicatifProgress {
    type SubProgress = Self;

    fn add_child(&mut self, name: impl Into<String>) -> Self {
        self.add_child_with_id(name, rand::random::<Id>())
    }

    fn add_child_with_id(&mut self, name: impl Into<String>, id: Id) -> Self {
        self.child(name.into(), id)
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }

        for (_, bar) in self.children.drain() {
            bar.finish_and_clear();
        }
    }
}
