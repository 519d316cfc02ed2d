use anyhow::Context;
use jackdaw_content::builtin_content;
use jackdaw_core::{
    Card, Event, GameView, Phase, PlayerAction, Rank, Replay, RunState, Suit,
};
use std::fs;
use std::io::{self, BufRead, Write};

struct CliOptions {
    seed: u64,
    auto: bool,
    replay: Option<String>,
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut options = CliOptions {
        seed: 0,
        auto: false,
        replay: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().context("--seed needs a value")?;
                options.seed = value.parse().context("seed must be a number")?;
            }
            "--auto" => options.auto = true,
            "--replay" => {
                options.replay = Some(args.next().context("--replay needs a file")?);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
    }
    Ok(options)
}

fn print_usage() {
    println!("jackdaw [--seed N] [--auto] [--replay FILE]");
    println!("  --seed N       start a run from seed N (default 0)");
    println!("  --auto         play the run with the built-in policy");
    println!("  --replay FILE  rebuild a run from a saved replay and print the result");
}

fn main() -> anyhow::Result<()> {
    let options = parse_args()?;
    if let Some(path) = &options.replay {
        return run_replay(path);
    }
    let mut run = RunState::new(options.seed, builtin_content())?;
    println!("seed {}", options.seed);
    if options.auto {
        autoplay(&mut run)?;
    } else {
        interactive(&mut run)?;
    }
    print_summary(&run);
    Ok(())
}

fn run_replay(path: &str) -> anyhow::Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let replay: Replay = serde_json::from_str(&text).context("parse replay JSON")?;
    let run = RunState::from_replay(&replay, builtin_content())?;
    println!(
        "replayed {} actions from seed {}",
        replay.actions.len(),
        replay.seed
    );
    print_summary(&run);
    Ok(())
}

/// Hit to 17, take everything else as it comes.
fn autoplay(run: &mut RunState) -> anyhow::Result<()> {
    loop {
        if matches!(run.phase, Phase::Victory | Phase::GameOver) {
            break;
        }
        let action = match run.phase {
            Phase::PlayerTurn => {
                let view = run.view();
                let score = view.hand.map(|h| h.player_score.value).unwrap_or(0);
                if score < 17 {
                    PlayerAction::Hit
                } else {
                    PlayerAction::Stand
                }
            }
            Phase::Shop => PlayerAction::LeaveShop,
            Phase::Wish => PlayerAction::Wish {
                text: "more luck".to_string(),
                blessing: None,
            },
            _ => PlayerAction::Continue,
        };
        let outcome = run.perform_action(action)?;
        if !outcome.success {
            anyhow::bail!("autoplay picked an unavailable action: {}", outcome.message);
        }
        for event in run.events.drain() {
            print_event(&event);
        }
    }
    Ok(())
}

fn interactive(run: &mut RunState) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        for event in run.events.drain() {
            print_event(&event);
        }
        if matches!(run.phase, Phase::Victory | Phase::GameOver) {
            break;
        }
        print_view(&run.view());
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut parts = line.trim().split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let action = match command {
            "continue" | "c" | "" => Some(PlayerAction::Continue),
            "hit" | "h" => Some(PlayerAction::Hit),
            "stand" | "s" => Some(PlayerAction::Stand),
            "double" | "d" => Some(PlayerAction::DoubleDown),
            "surrender" => Some(PlayerAction::Surrender),
            "peek" => Some(PlayerAction::Peek),
            "remove" => parts
                .next()
                .and_then(|v| v.parse().ok())
                .map(|index| PlayerAction::RemoveCard { index }),
            "buy" => parts
                .next()
                .and_then(|v| v.parse().ok())
                .map(|index| PlayerAction::BuyItem { index }),
            "leave" => Some(PlayerAction::LeaveShop),
            "wish" => Some(PlayerAction::Wish {
                text: parts.collect::<Vec<_>>().join(" "),
                blessing: None,
            }),
            "save" => {
                if let Some(path) = parts.next() {
                    let json = serde_json::to_string_pretty(&run.replay())?;
                    fs::write(path, json).with_context(|| format!("write {path}"))?;
                    println!("saved");
                } else {
                    println!("save needs a file name");
                }
                None
            }
            "quit" | "exit" => break,
            _ => {
                println!("commands: continue hit stand double surrender peek remove I buy I leave wish TEXT save FILE quit");
                None
            }
        };
        if let Some(action) = action {
            match run.perform_action(action) {
                Ok(outcome) => {
                    if !outcome.message.is_empty() {
                        println!("{}", outcome.message);
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(())
}

fn card_label(card: Card) -> String {
    let rank = match card.rank {
        Rank::Ace => "A",
        Rank::Two => "2",
        Rank::Three => "3",
        Rank::Four => "4",
        Rank::Five => "5",
        Rank::Six => "6",
        Rank::Seven => "7",
        Rank::Eight => "8",
        Rank::Nine => "9",
        Rank::Ten => "10",
        Rank::Jack => "J",
        Rank::Queen => "Q",
        Rank::King => "K",
    };
    let suit = match card.suit {
        Suit::Spades => "♠",
        Suit::Hearts => "♥",
        Suit::Clubs => "♣",
        Suit::Diamonds => "♦",
    };
    format!("{rank}{suit}")
}

fn print_view(view: &GameView) {
    println!(
        "stage {} battle {} | hp {}/{} gold {}",
        view.stage, view.battle_in_stage, view.player.hp, view.player.max_hp, view.player.gold
    );
    if let Some(enemy) = &view.enemy {
        let tag = if enemy.boss { " [boss]" } else { "" };
        println!("vs {}{} ({}/{})", enemy.name, tag, enemy.hp, enemy.max_hp);
    }
    if let Some(hand) = &view.hand {
        let yours: Vec<String> = hand.player_cards.iter().map(|&c| card_label(c)).collect();
        let theirs: Vec<String> = hand.enemy_cards.iter().map(|&c| card_label(c)).collect();
        let hidden = if hand.hole_hidden { " ??" } else { "" };
        println!(
            "you: {} ({}) | them: {}{}",
            yours.join(" "),
            hand.player_score.value,
            theirs.join(" "),
            hidden
        );
    }
    for (index, offer) in view.shop.iter().enumerate() {
        println!("  [{index}] {} — {}g: {}", offer.name, offer.price, offer.description);
    }
}

fn print_event(event: &Event) {
    match event {
        Event::BattleStarted { enemy, boss } => {
            let tag = if *boss { " (boss)" } else { "" };
            println!("-- {enemy}{tag} steps up --");
        }
        Event::CursedBy { curse } => println!("you are cursed: {curse}"),
        Event::HandResolved { outcome, player, enemy } => {
            println!("{outcome:?}: {} vs {}", player.value, enemy.value)
        }
        Event::PlayerDamaged { amount, hp, source } => {
            println!("{source} hits you for {amount} ({hp} hp left)")
        }
        Event::EnemyDamaged { amount, hp } => println!("you hit for {amount} ({hp} hp left)"),
        Event::PlayerHealed { amount, hp } => println!("healed {amount} ({hp} hp)"),
        Event::GoldChanged { delta, gold } => println!("gold {delta:+} ({gold})"),
        Event::Dodged { side } => println!("{side:?} dodges"),
        Event::BustSaved { side, score } => println!("{side:?} shrugs off a bust at {score}"),
        Event::EnemyDefeated { enemy } => println!("{enemy} is defeated"),
        Event::StageCleared { stage } => println!("== stage {stage} cleared =="),
        Event::WishGranted { blessing } => println!("the genie grants: {blessing}"),
        Event::ItemBought { name, price } => println!("bought {name} for {price}g"),
        Event::EffectExpired { name } => println!("{name} wears off"),
        Event::GameOver { cause } => println!("you fall ({cause:?})"),
        Event::Victory => println!("the third lamp goes dark. You win."),
        _ => {}
    }
}

fn print_summary(run: &RunState) {
    match run.phase {
        Phase::Victory => println!(
            "VICTORY — hp {} gold {} after {} hands won",
            run.player.hp, run.player.gold, run.hands_won
        ),
        Phase::GameOver => println!(
            "GAME OVER at stage {} battle {} ({:?})",
            run.stage,
            run.battle_in_stage,
            run.kill_cause
        ),
        _ => println!("run paused at {:?}", run.phase),
    }
}
