fn main() {
    if let Err(e) = carbonate_rs::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
