use std::fs::File;
use std::io::{self, BufRead, Write as _};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use monofs::storage::FileBackedStorage;
use monofs::{FileSystem, Fkey, Session};

#[derive(Parser)]
#[command(version, about = "Interactive shell over a single-file volume")]
struct Args {
    /// Volume image file
    image: PathBuf,

    /// Format the image with the given inode count before starting
    #[arg(long, value_name = "N")]
    mkfs: Option<i64>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let storage = open_image(&args.image)?;

    let fs = match args.mkfs {
        Some(n) => FileSystem::format(storage, n)?,
        None => FileSystem::mount(storage)
            .context("mounting image (pass --mkfs N to format a new one)")?,
    };

    repl(Session::new(fs), &args.image)
}

fn open_image(image: &Path) -> Result<FileBackedStorage> {
    let file = File::options()
        .read(true)
        .write(true)
        .create(true)
        .open(image)
        .with_context(|| format!("opening image {}", image.display()))?;
    Ok(FileBackedStorage::new(file))
}

fn repl(mut session: Session<FileBackedStorage>, image: &Path) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens[0] == "exit" {
            println!("Bye!");
            break;
        }

        dispatch(&mut session, image, &tokens);
    }

    session.shutdown()?;
    Ok(())
}

fn dispatch(session: &mut Session<FileBackedStorage>, image: &Path, tokens: &[&str]) {
    match tokens {
        ["create", path] => report(session.create_file(path).map(drop)),
        ["mkdir", path] => report(session.mkdir(path).map(drop)),
        ["ls"] => report(list(session, "")),
        ["ls", path] => report(list(session, path)),
        ["link", from, to] => report(session.link(from, to)),
        ["unlink", path] => report(session.unlink(path)),
        ["truncate", path, size] => match size.parse() {
            Ok(size) => report(session.truncate(path, size)),
            Err(_) => println!("size should be an integer"),
        },
        ["stat", path] => report(session.stat(path).map(|stat| println!("{stat}"))),
        ["open", path] => report(session.open(path).map(|key| println!("fd = {key}"))),
        ["write", fd, data @ ..] if !data.is_empty() => {
            let data = data.join(" ");
            report(session.write(&Fkey::new(*fd), data.as_bytes()).map(drop));
        }
        ["read", fd, length] => match length.parse() {
            Ok(length) => report(
                session
                    .read(&Fkey::new(*fd), length)
                    .map(|data| println!("{}", String::from_utf8_lossy(&data))),
            ),
            Err(_) => println!("length should be an integer"),
        },
        ["seek", fd, offset] => match offset.parse() {
            Ok(offset) => report(session.seek(&Fkey::new(*fd), offset)),
            Err(_) => println!("offset should be an integer"),
        },
        ["close", fd] => report(session.close(&Fkey::new(*fd))),
        ["mkfs", n] => match n.parse() {
            Ok(n) => match open_image(image) {
                Ok(storage) => report(session.mkfs(storage, n)),
                Err(err) => println!("Error: {err}"),
            },
            Err(_) => println!("n should be an integer"),
        },
        ["cd", path] => report(session.cd(path)),
        ["rmdir", path] => report(session.rmdir(path)),
        ["symlink", target, linkpath] => report(session.symlink(target, linkpath).map(drop)),
        ["help"] => help(),
        _ => {
            println!("unrecognized command: {}", tokens.join(" "));
            help();
        }
    }
}

fn list(session: &Session<FileBackedStorage>, path: &str) -> monofs::Result<()> {
    let entries = session.list(path)?;
    println!("inode\tname");
    for entry in entries {
        println!("{}\t{}", entry.inode, entry.name);
    }
    Ok(())
}

fn report(result: monofs::Result<()>) {
    if let Err(err) = result {
        println!("Error: {err}");
    }
}

fn help() {
    println!(
        "commands:\n\
         \tmkfs <n> | create <path> | mkdir <path> | ls [path] | cd <path>\n\
         \tlink <from> <to> | unlink <path> | rmdir <path> | symlink <target> <linkpath>\n\
         \tstat <path> | truncate <path> <size>\n\
         \topen <path> | write <fd> <data> | read <fd> <length> | seek <fd> <offset> | close <fd>\n\
         \thelp | exit"
    );
}
