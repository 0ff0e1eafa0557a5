use tenant_risk_cli::run;

fn main() {
    if let Err(err) = run() {
        eprintln!("application error: {err}");
        // 2 for rejected input, 1 for setup or I/O failures.
        let code = if err.is_client_error() { 2 } else { 1 };
        std::process::exit(code);
    }
}
