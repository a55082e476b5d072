fn main() {
    if let Err(e) = meal_planner_lib::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
