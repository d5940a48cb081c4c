//! Interactive move entry from standard input

use std::io::{self, BufRead, StdinLock, Write};

/// Prompts for the two move coordinates, re-asking until both parse as
/// integers inside the board. Runs on the blocking thread pool because
/// stdin has no async story worth having for a line-oriented prompt.
pub async fn read_move(board_size: usize) -> io::Result<(i32, i32)> {
    tokio::task::spawn_blocking(move || read_move_blocking(board_size))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}

fn read_move_blocking(board_size: usize) -> io::Result<(i32, i32)> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let x = prompt_coordinate(&mut lines, "x", board_size)?;
    let y = prompt_coordinate(&mut lines, "y", board_size)?;
    Ok((x, y))
}

fn prompt_coordinate(
    lines: &mut io::Lines<StdinLock<'_>>,
    axis: &str,
    board_size: usize,
) -> io::Result<i32> {
    loop {
        print!("Enter {} coordinate (0-{}): ", axis, board_size - 1);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while reading a move",
            ));
        };
        match line?.trim().parse::<i32>() {
            Ok(value) if value >= 0 && (value as usize) < board_size => return Ok(value),
            Ok(value) => println!("{} is outside the board (0-{})", value, board_size - 1),
            Err(_) => println!("Please enter a whole number"),
        }
    }
}
