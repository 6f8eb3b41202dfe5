use myshell::Interpreter;

fn main() {
    let mut sh = Interpreter::default();
    match sh.repl() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("myshell: {err}");
            std::process::exit(1);
        }
    }
}
