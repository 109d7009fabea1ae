use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fmt, fs, io, process, thread};

use log::{info, error, debug};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use roots::lisp::{CORE, LispError, LispErrorType, LispRuntime};

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RootsConfig {
	prompt: String,
	continuation_prompt: String,
	/// replaces the builtin core.lisp
	prelude: Option<PathBuf>,
	no_prelude: bool,
	max_depth: usize,
	/// bytes, for the thread everything gets evaluated on
	stack_size: usize,
	log_level: String,
}

impl Default for RootsConfig {
	fn default() -> Self {
		Self {
			prompt: ">>> ".to_string(),
			continuation_prompt: "... ".to_string(),
			prelude: None,
			no_prelude: false,
			max_depth: 10_000,
			stack_size: 256 * 1024 * 1024,
			log_level: "warn".to_string(),
		}
	}
}

#[derive(Debug)]
enum ConfigError {
	Read(io::Error),
	Parse(toml::de::Error),
	LogLevel(String),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Read(err) => write!(f, "can't read config: {}", err),
			ConfigError::Parse(err) => write!(f, "can't parse config: {}", err),
			ConfigError::LogLevel(v) => write!(f, "unknown log_level {:?}", v),
		}
	}
}

impl RootsConfig {
	fn parse(data: &[u8]) -> Result<Self, ConfigError> {
		let config: RootsConfig = toml::from_slice(data).map_err(ConfigError::Parse)?;
		config.level_filter()?;
		Ok(config)
	}
	/// a missing file is fine, anything else wrong with it isn't
	fn load(path: &Path) -> Result<Self, ConfigError> {
		match fs::read(path) {
			Ok(data) => Self::parse(&data),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
			Err(err) => Err(ConfigError::Read(err)),
		}
	}
	fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
		log::LevelFilter::from_str(&self.log_level).map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
	}
}

fn print_error(err: &LispError) {
	println!("Error: {}", err);
	let excerpt = err.print();
	if !excerpt.is_empty() {
		println!("{}", excerpt);
	}
}

fn eprint_error(err: &LispError) {
	eprintln!("Error: {}", err);
	let excerpt = err.print();
	if !excerpt.is_empty() {
		eprintln!("{}", excerpt);
	}
}

/// startup script errors are fatal
fn load_prelude(config: &RootsConfig, rt: &mut LispRuntime) -> Result<(), ()> {
	if config.no_prelude {
		return Ok(())
	}
	let res = match &config.prelude {
		Some(path) => {
			let text = fs::read_to_string(path).map_err(|err| {
				eprintln!("roots: {}: {}", path.display(), err);
			})?;
			rt.load(&path.to_string_lossy(), &text)
		},
		None => rt.load("core.lisp", CORE),
	};
	res.map_err(|err| eprint_error(&err))
}

fn print_help() {
	println!("Enter s-expressions, e.g. (cons 'a '(b c))");
	println!("Operators: quote atom eq car cdr cons cond lambda label defun");
	println!("Commands:");
	println!("  :help          this text");
	println!("  :env           list everything defined so far");
	println!("  :quit, :exit   leave (Ctrl+D works too)");
}

fn print_env(rt: &LispRuntime) {
	match rt.bindings() {
		Ok(bindings) if bindings.is_empty() => println!("nothing defined"),
		Ok(bindings) => for (name, value) in bindings {
			println!("{} = {}", name, value);
		},
		Err(err) => print_error(&err),
	}
}

fn repl(config: &RootsConfig, rt: &mut LispRuntime) -> i32 {
	let mut rl = match DefaultEditor::new() {
		Ok(v) => v,
		Err(err) => {
			eprintln!("roots: can't start the line editor: {}", err);
			return 1
		},
	};
	println!("roots, the seven primitive operators of lisp plus lambda, label and defun");
	println!("Type :help for commands, Ctrl+D to exit.");
	// lines of a list that isn't closed yet
	let mut pending = String::new();
	loop {
		let prompt = if pending.is_empty() { &config.prompt } else { &config.continuation_prompt };
		match rl.readline(prompt) {
			Ok(line) => {
				if pending.is_empty() {
					let trimmed = line.trim();
					if trimmed.is_empty() { continue }
					let _ = rl.add_history_entry(trimmed);
					match trimmed {
						":help" => { print_help(); continue },
						":env" => { print_env(rt); continue },
						":quit" | ":exit" => break,
						_ => {},
					}
				} else {
					let _ = rl.add_history_entry(line.as_str());
					pending.push('\n');
				}
				pending.push_str(&line);
				match rt.evaluate("repl", &pending) {
					Err(LispError(LispErrorType::UnclosedList(..), _)) => {
						debug!("waiting for more input");
					},
					Err(err) => {
						pending.clear();
						print_error(&err);
					},
					Ok(results) => {
						pending.clear();
						for res in results {
							match res {
								Ok(v) => println!("{}", v),
								Err(err) => {
									print_error(&err);
									if err.kind().is_fatal() {
										return 1
									}
								},
							}
						}
					},
				}
			},
			Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
			Err(err) => {
				error!("readline: {}", err);
				return 1
			},
		}
	}
	0
}

/// every file against the same runtime, stopping at the first error
fn batch(rt: &mut LispRuntime, files: &[String]) -> i32 {
	for file in files {
		let text = match fs::read_to_string(file) {
			Ok(v) => v,
			Err(err) => {
				eprintln!("roots: {}: {}", file, err);
				return 1
			},
		};
		info!("running {}", file);
		let results = match rt.evaluate(file, &text) {
			Ok(v) => v,
			Err(err) => {
				eprint_error(&err);
				return 1
			},
		};
		for res in results {
			match res {
				Ok(v) => println!("{}", v),
				Err(err) => {
					eprint_error(&err);
					return 1
				},
			}
		}
	}
	0
}

fn run(config: RootsConfig, files: Vec<String>) -> i32 {
	let mut rt = LispRuntime::new(config.max_depth);
	if load_prelude(&config, &mut rt).is_err() {
		return 1
	}
	if files.is_empty() {
		repl(&config, &mut rt)
	} else {
		batch(&mut rt, &files)
	}
}

fn main() {
	let path = env::var_os("ROOTS_CONFIG").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("roots.toml"));
	let config = match RootsConfig::load(&path) {
		Ok(v) => v,
		Err(err) => {
			eprintln!("roots: {}: {}", path.display(), err);
			process::exit(2)
		},
	};
	env_logger::Builder::new()
		.filter_level(log::LevelFilter::Warn)
		.filter_module("roots", config.level_filter().unwrap_or(log::LevelFilter::Warn))
		.init();
	debug!("config: {:?}", config);
	let files: Vec<String> = env::args().skip(1).collect();
	let code = thread::Builder::new()
		.name("eval".to_string())
		.stack_size(config.stack_size)
		.spawn(move || run(config, files))
		.map_err(|err| error!("can't spawn the eval thread: {}", err))
		.and_then(|handle| handle.join().map_err(|_| error!("eval thread panicked")))
		.unwrap_or(1);
	process::exit(code)
}
