//! Command implementations

mod collect;
mod find;
mod run;

pub use collect::collect;
pub use find::find;
pub use run::run;

use gradle_runner::adapters::{Envman, StdoutExporter};
use gradle_runner::core::ports::EnvExporter;

/// The exporter selected by `--print-env`
fn exporter(print_env: bool) -> Box<dyn EnvExporter> {
    if print_env {
        Box::new(StdoutExporter)
    } else {
        Box::new(Envman::default())
    }
}
