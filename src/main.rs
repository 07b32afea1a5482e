fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Invoked by the installer host as:
    //   item-template-installer install|rollback|uninstall /TargetDir=<payload folder>
    std::process::exit(item_template_installer::run_cli(&args));
}
