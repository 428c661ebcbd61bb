fn main() -> std::process::ExitCode {
    daily_checklist_lib::run()
}
