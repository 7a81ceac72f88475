use std::process::ExitCode;

fn main() -> ExitCode {
    match rinha_load::entry::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
