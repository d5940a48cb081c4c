//! Terminal rendering of server messages

use shared::{BoardPhase, BoardSnapshot, Player};

pub fn show_hello(text: &str, player: Player) {
    println!("{text}");
    println!("You are playing as {player}");
}

pub fn show_waiting() {
    println!("Waiting for another player to connect...");
}

pub fn show_board(snapshot: &BoardSnapshot) {
    println!();
    print!("{}", snapshot.rendered);
}

pub fn show_game_over(phase: &BoardPhase) {
    match phase {
        BoardPhase::Won(player) => println!("Game over: player {player} wins!"),
        BoardPhase::Draw => println!("Game over: it's a draw."),
        BoardPhase::Playing => {}
    }
}

pub fn show_turn_prompt(player: Player) {
    println!("Your move, player {player}.");
}

pub fn show_error(text: &str) {
    println!("Error: {text}");
}

pub fn show_disconnect() {
    println!("Server closed the connection");
}
