use std::process::ExitCode;
use track_map_inspector::{Settings, logging, run};

fn main() -> ExitCode {
    logging::setup_logging();
    let settings = Settings::from_cli();

    let rendered = run(&settings).and_then(|report| {
        if settings.json {
            report.to_json()
        } else {
            Ok(report.to_text())
        }
    });

    match rendered {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to inspect {}: {}", settings.route.display(), e);
            ExitCode::FAILURE
        }
    }
}
