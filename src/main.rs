fn main() {
    std::process::exit(rich_editor_lib::run());
}
