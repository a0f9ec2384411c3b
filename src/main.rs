fn main() {
    std::process::exit(plugcalc::app::startup::startup());
}
