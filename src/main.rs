fn main() {
    let code = match nudge::run::run() {
        Ok(code) => code,
        Err(err) => {
            println!("nudge: error: {}", err);
            1
        }
    };
    std::process::exit(code);
}
