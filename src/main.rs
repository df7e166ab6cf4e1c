use std::process::ExitCode;

use apiconf::artifact::ArtifactError;
use apiconf::ui::output;

fn main() -> ExitCode {
    match apiconf::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            match err.downcast_ref::<ArtifactError>() {
                Some(ArtifactError::Stale(_)) => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}
