use crate::format::{format_event, print_hand, print_shop, print_state};
use anyhow::Context;
use gemfire_core::{
    Augmentation, Catalog, EventBus, GameConfig, GemInstanceId, PlayerClass, RunError, RunState,
};
use gemfire_data::{default_save_path, load_snapshot, save_snapshot};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Help,
    Quit,
    State,
    Hand,
    Shop,
    Start,
    Play(Vec<GemInstanceId>),
    Wait,
    Discard(Vec<GemInstanceId>),
    Flee,
    Enemy,
    Buy(usize),
    Remove(GemInstanceId),
    Upgrade(GemInstanceId, Augmentation),
    Heal,
    Leave,
    Rest,
    Bank(i64),
    Unlock(String),
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
}

fn parse_ids(args: &[&str]) -> Result<Vec<GemInstanceId>, String> {
    if args.is_empty() {
        return Err("expected gem ids, e.g. `play 3 5`".to_string());
    }
    args.iter().map(|arg| parse_id(arg)).collect()
}

fn parse_id(arg: &str) -> Result<GemInstanceId, String> {
    arg.trim_start_matches('#')
        .parse::<u32>()
        .map(GemInstanceId)
        .map_err(|_| format!("not a gem id: {arg}"))
}

fn parse_augmentation(arg: &str) -> Result<Augmentation, String> {
    Augmentation::ALL
        .into_iter()
        .find(|item| item.id_suffix() == arg)
        .ok_or_else(|| format!("unknown augmentation {arg} (piercing, swift, powerful, lasting)"))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    let number = |arg: Option<&&str>| -> Result<i64, String> {
        let arg = arg.ok_or("expected a number")?;
        arg.parse::<i64>().map_err(|_| format!("not a number: {arg}"))
    };
    let command = match cmd {
        "help" | "h" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "state" | "s" => Command::State,
        "hand" => Command::Hand,
        "shop" => Command::Shop,
        "start" | "fight" => Command::Start,
        "play" | "p" => Command::Play(parse_ids(&args)?),
        "wait" | "w" => Command::Wait,
        "discard" | "d" => Command::Discard(parse_ids(&args)?),
        "flee" => Command::Flee,
        "enemy" | "e" => Command::Enemy,
        "buy" => {
            let index = number(args.first())?;
            Command::Buy(usize::try_from(index).map_err(|_| "offer index must be >= 0")?)
        }
        "remove" => Command::Remove(parse_id(args.first().ok_or("expected a gem id")?)?),
        "upgrade" => {
            let id = parse_id(args.first().ok_or("expected a gem id")?)?;
            let augmentation = parse_augmentation(args.get(1).ok_or("expected an augmentation")?)?;
            Command::Upgrade(id, augmentation)
        }
        "heal" => Command::Heal,
        "leave" | "next" => Command::Leave,
        "rest" => Command::Rest,
        "bank" => Command::Bank(number(args.first())?),
        "unlock" => Command::Unlock(args.first().ok_or("expected a gem id")?.to_string()),
        "save" => Command::Save(args.first().map(PathBuf::from)),
        "load" => Command::Load(args.first().map(PathBuf::from)),
        other => return Err(format!("unknown command {other}, try `help`")),
    };
    Ok(command)
}

fn print_help() {
    println!("battle: start | play <ids..> | wait | discard <ids..> | flee | enemy");
    println!("shop:   buy <index> | remove <id> | upgrade <id> <aug> | heal | leave");
    println!("camp:   rest | bank <amount> | unlock <gem> | leave");
    println!("info:   state | hand | shop | save [path] | load [path] | help | quit");
}

fn apply(run: &mut RunState, command: &Command, events: &mut EventBus) -> Result<(), RunError> {
    match command {
        Command::Start => run.start_battle(events)?,
        Command::Play(ids) => {
            run.play_gems(ids, events)?;
        }
        Command::Wait => run.wait(events)?,
        Command::Discard(ids) => run.discard_and_end(ids, events)?,
        Command::Flee => run.flee(events)?,
        Command::Enemy => {
            run.run_enemy_turn(events)?;
        }
        Command::Buy(index) => {
            run.buy_offer(*index, events)?;
        }
        Command::Remove(id) => run.remove_gem(*id, events)?,
        Command::Upgrade(id, augmentation) => run.upgrade_gem(*id, *augmentation, events)?,
        Command::Heal => {
            run.buy_heal(events)?;
        }
        Command::Leave => match run.stage {
            gemfire_core::Stage::Camp => run.leave_camp(events)?,
            _ => run.leave_shop(events)?,
        },
        Command::Rest => {
            run.rest(events)?;
        }
        Command::Bank(amount) => run.bank(*amount, events)?,
        Command::Unlock(gem) => run.unlock_gem(gem, events)?,
        Command::Help
        | Command::Quit
        | Command::State
        | Command::Hand
        | Command::Shop
        | Command::Save(_)
        | Command::Load(_) => {}
    }
    Ok(())
}

pub fn run(
    config: GameConfig,
    catalog: Catalog,
    class: PlayerClass,
    seed: u64,
    load: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut run = match load {
        Some(path) => {
            let snapshot = load_snapshot(&path)?;
            RunState::restore(config.clone(), catalog.clone(), snapshot)?
        }
        None => RunState::new(config.clone(), catalog.clone(), class, seed)?,
    };
    let mut events = EventBus::default();
    print_help();
    print_state(&run);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("gemfire> ");
        io::stdout().flush().context("flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        match &command {
            Command::Quit => break,
            Command::Help => print_help(),
            Command::State => print_state(&run),
            Command::Hand => print_hand(&run),
            Command::Shop => print_shop(&run),
            Command::Save(path) => {
                let Some(path) = path.clone().or_else(default_save_path) else {
                    println!("no save path; pass one or set GEMFIRE_SAVE");
                    continue;
                };
                match save_snapshot(&path, &run.snapshot()) {
                    Ok(()) => println!("saved to {}", path.display()),
                    Err(err) => println!("save failed: {err:#}"),
                }
            }
            Command::Load(path) => {
                let Some(path) = path.clone().or_else(default_save_path) else {
                    println!("no save path; pass one or set GEMFIRE_SAVE");
                    continue;
                };
                let restored = load_snapshot(&path).and_then(|snapshot| {
                    RunState::restore(config.clone(), catalog.clone(), snapshot)
                        .map_err(anyhow::Error::from)
                });
                match restored {
                    Ok(loaded) => {
                        run = loaded;
                        println!("loaded {}", path.display());
                        print_state(&run);
                    }
                    Err(err) => println!("load failed: {err:#}"),
                }
            }
            other => {
                let result = apply(&mut run, other, &mut events);
                for event in events.drain() {
                    println!("  {}", format_event(&event));
                }
                if let Err(err) = result {
                    println!("rejected: {err}");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_ids_and_arguments() {
        assert_eq!(
            parse_command("play 3 #5"),
            Ok(Command::Play(vec![GemInstanceId(3), GemInstanceId(5)]))
        );
        assert_eq!(
            parse_command("upgrade 2 swift"),
            Ok(Command::Upgrade(GemInstanceId(2), Augmentation::Swift))
        );
        assert_eq!(parse_command("bank 15"), Ok(Command::Bank(15)));
        assert_eq!(parse_command("save"), Ok(Command::Save(None)));
    }

    #[test]
    fn bad_input_is_reported_not_applied() {
        assert!(parse_command("play").is_err());
        assert!(parse_command("buy -1").is_err());
        assert!(parse_command("upgrade 2 shiny").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn rejected_commands_leave_the_run_untouched() {
        let mut run = RunState::new(
            GameConfig::default(),
            Catalog::builtin(),
            PlayerClass::Knight,
            9,
        )
        .expect("run");
        let mut events = EventBus::default();

        let err = apply(&mut run, &Command::Rest, &mut events).expect_err("not at camp");
        assert!(matches!(err, RunError::InvalidEncounterContext(_)));
        assert!(events.is_empty());

        apply(&mut run, &Command::Start, &mut events).expect("start");
        assert!(run.battle_in_progress());
    }
}
