fn main() {
    if let Err(err) = anchor_node::run_entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
