fn main() {
    if let Err(err) = plan_forest::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
