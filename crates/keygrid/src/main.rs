#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = keygrid::run_from_env() {
        eprintln!("keygrid: {error}");
        std::process::exit(error.exit_code());
    }
}
