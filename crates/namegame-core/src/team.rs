/// A robotics team number as entered by players.
pub type TeamNumber = u32;

/// First decimal digit of a team number.
pub fn leading_digit(team: TeamNumber) -> u32 {
    let mut n = team;
    while n >= 10 {
        n /= 10;
    }
    n
}

/// Last decimal digit of a team number. Zero means the next pick is a wildcard.
pub fn trailing_digit(team: TeamNumber) -> u32 {
    team % 10
}
