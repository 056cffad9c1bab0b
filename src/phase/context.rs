use crate::config::Config;
use crate::exec::Executor;
use crate::ui::Reporter;
use crate::variant::Variant;

/// Everything a phase body needs
pub struct PhaseContext<'a> {
    pub config: &'a Config,
    pub variant: Variant,
    /// Build parallelism for `make -j`
    pub jobs: usize,
    pub exec: &'a mut dyn Executor,
    pub ui: &'a Reporter,
}

impl<'a> PhaseContext<'a> {
    pub fn new(
        config: &'a Config,
        variant: Variant,
        jobs: usize,
        exec: &'a mut dyn Executor,
        ui: &'a Reporter,
    ) -> Self {
        Self {
            config,
            variant,
            jobs: jobs.max(1),
            exec,
            ui,
        }
    }
}
