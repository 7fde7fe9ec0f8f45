use gemfire_core::{Actor, DayPhase, Event, RunState, Stage, StatusLedger};

fn actor(actor: Actor) -> &'static str {
    match actor {
        Actor::Player => "you",
        Actor::Enemy => "enemy",
    }
}

fn phase(phase: DayPhase) -> &'static str {
    match phase {
        DayPhase::Dawn => "dawn",
        DayPhase::Dusk => "dusk",
        DayPhase::Dark => "dark",
    }
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::BattleStarted {
            day,
            phase: at,
            enemy,
            health,
            boss,
        } => {
            let tag = if *boss { " (boss)" } else { "" };
            format!("day {day} {}: {enemy}{tag} appears with {health} health", phase(*at))
        }
        Event::HandDrawn { count } => format!("drew {count} gem(s)"),
        Event::DiscardRecycled { count } => format!("{count} gem(s) shuffled back into the bag"),
        Event::GemPlayed {
            instance,
            gem,
            success,
        } => {
            let result = if *success { "succeeds" } else { "fails" };
            format!("gem {instance} {gem} {result}")
        }
        Event::MasteryImproved { gem, mastery } => format!("{gem} mastery now {mastery}"),
        Event::DamageDealt {
            source,
            target,
            amount,
            absorbed,
            health,
        } => {
            let blocked = if *absorbed > 0 {
                format!(" ({absorbed} absorbed)")
            } else {
                String::new()
            };
            format!(
                "{} hit {} for {amount}{blocked}, {health} left",
                actor(*source),
                actor(*target)
            )
        }
        Event::DamageReflected { amount, health } => {
            format!("parry reflects {amount}, enemy at {health}")
        }
        Event::Healed {
            target,
            amount,
            health,
        } => format!("{} healed {amount}, now {health}", actor(*target)),
        Event::StatusApplied {
            target,
            kind,
            magnitude,
            turns,
        } => match turns {
            Some(turns) => format!(
                "{} gains {kind:?} {magnitude} for {turns} turn(s)",
                actor(*target)
            ),
            None => format!("{} gains {kind:?} {magnitude}", actor(*target)),
        },
        Event::StatusTicked {
            target,
            kind,
            amount,
        } => format!("{kind:?} ticks on {} for {amount}", actor(*target)),
        Event::StatusExpired { target, kind } => {
            format!("{kind:?} wears off {}", actor(*target))
        }
        Event::EnemyActionChosen { action } => format!("enemy prepares {action}"),
        Event::EnemyActed { action } => format!("enemy uses {action}"),
        Event::EnemyEnraged { attack } => format!("enemy enrages, attack {attack}"),
        Event::EnemyPhaseShift { attack } => format!("enemy shifts phase, attack {attack}"),
        Event::ZennyStolen { amount, zenny } => format!("{amount} zenny stolen, {zenny} left"),
        Event::TurnSkipped { actor: who } => format!("{} skip a turn", actor(*who)),
        Event::TurnEnded { stamina_spent } => format!("turn ends, {stamina_spent} stamina spent"),
        Event::StaminaRecovered { amount, stamina } => {
            format!("recovered {amount} stamina, now {stamina}")
        }
        Event::Victory { reward, zenny } => format!("victory: +{reward} zenny ({zenny})"),
        Event::Defeat => "defeat".to_string(),
        Event::Fled => "you fled".to_string(),
        Event::BattleOver { outcome } => format!("battle over: {outcome:?}"),
        Event::ShopEntered { offers } => format!("shop opens with {offers} offer(s)"),
        Event::GemBought { gem, cost, zenny } => format!("bought {gem} for {cost} ({zenny} left)"),
        Event::GemRemoved {
            instance,
            cost,
            zenny,
        } => format!("removed gem {instance} for {cost} ({zenny} left)"),
        Event::GemUpgraded {
            instance,
            gem,
            cost,
            zenny,
        } => format!("gem {instance} is now {gem} for {cost} ({zenny} left)"),
        Event::CampEntered { day } => format!("camp for the night of day {day}"),
        Event::Rested { amount, health } => format!("rested for {amount}, now {health}"),
        Event::ZennyBanked { amount, banked } => format!("banked {amount} ({banked} total)"),
        Event::GemUnlocked { gem, banked } => format!("unlocked {gem} ({banked} banked)"),
        Event::DayStarted { day } => format!("day {day} begins"),
        Event::RunWon { day } => format!("run won on day {day}"),
        Event::RunLost { day, phase: at } => format!("run lost on day {day} {}", phase(*at)),
    }
}

fn statuses(ledger: &StatusLedger) -> String {
    if ledger.is_empty() {
        return "-".to_string();
    }
    ledger
        .iter()
        .map(|effect| match effect.duration.turns() {
            Some(turns) => format!("{:?} {} ({turns})", effect.kind, effect.magnitude),
            None => format!("{:?} {}", effect.kind, effect.magnitude),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_state(run: &RunState) {
    let player = &run.player;
    println!(
        "day {} {} | stage {:?} | {:?} health {}/{} stamina {}/{} zenny {} banked {}",
        run.day,
        phase(run.phase),
        run.stage,
        player.class,
        player.health,
        player.max_health,
        player.stamina,
        player.max_stamina,
        player.zenny,
        run.meta.zenny
    );
    println!("  buffs: {}", statuses(&player.buffs));
    if let Some(battle) = run.battle.as_ref().filter(|battle| battle.in_progress()) {
        let enemy = &battle.enemy;
        println!(
            "  {}: health {}/{} attack {} next {} | {}",
            enemy.name,
            enemy.health,
            enemy.max_health,
            enemy.effective_attack(),
            enemy.next_action,
            statuses(&enemy.buffs)
        );
    }
    print_hand(run);
    if run.stage == Stage::Shop {
        print_shop(run);
    }
}

pub fn print_hand(run: &RunState) {
    println!(
        "  bag {} | discard {} | hand:",
        run.inventory.bag().len(),
        run.inventory.discard_pile().len()
    );
    for gem in run.inventory.hand() {
        println!(
            "    {} {} [{}] cost {} mastery {}",
            gem.id,
            gem.def.name,
            gem.def.id,
            gem.cost(),
            gem.mastery
        );
    }
}

pub fn print_shop(run: &RunState) {
    let Some(shop) = run.shop.as_ref() else {
        return;
    };
    for (index, offer) in shop.offers.iter().enumerate() {
        let sold = if offer.sold { " (sold)" } else { "" };
        println!("    [{index}] {} for {}{sold}", offer.gem.name, offer.price);
    }
    let rule = &run.config.shop;
    println!(
        "    heal {} for {} | upgrade {} | remove {}",
        rule.heal_amount, rule.heal_cost, rule.upgrade_cost, rule.removal_cost
    );
}
