use crate::geometry::{Point, unobstructed};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display names for the palette, in color index order.
pub const COLOR_NAMES: [&str; 7] = ["Red", "Green", "Blue", "Yellow", "Orange", "Magenta", "Cyan"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color(pub u8);

impl Color {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        COLOR_NAMES.get(self.index()).copied().unwrap_or("Unknown")
    }

    pub fn all(num_colors: usize) -> impl Iterator<Item = Color> {
        (0..num_colors).map(|i| Color(i as u8))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl PieceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "Player 1"),
            Player::Two => write!(f, "Player 2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStatus {
    Uncaptured,
    CapturedBy(Player),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    color: Color,
    position: Point,
    status: CaptureStatus,
}

impl Piece {
    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Normalized position, fixed at setup.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_captured(&self) -> bool {
        self.status != CaptureStatus::Uncaptured
    }

    pub fn captured_by(&self) -> Option<Player> {
        match self.status {
            CaptureStatus::Uncaptured => None,
            CaptureStatus::CapturedBy(player) => Some(player),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub position: Point,
    pub owner: Player,
}

/// Captured piece counts for one player, indexed by color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: Vec<usize>,
}

impl Tally {
    pub fn new(num_colors: usize) -> Self {
        Tally {
            counts: vec![0; num_colors],
        }
    }

    pub fn get(&self, color: Color) -> usize {
        self.counts.get(color.index()).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn distinct_colors(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Colors in which this player holds more than half of the pieces.
    pub fn majorities(&self, pieces_per_color: usize) -> usize {
        self.counts
            .iter()
            .filter(|&&c| c > pieces_per_color / 2)
            .count()
    }

    fn add(&mut self, color: Color, n: usize) {
        self.counts[color.index()] += n;
    }
}

/// Every piece and token of one game, plus both players' tallies.
///
/// Pieces are stored by id (`id = color * pieces_per_color + index`) and
/// never removed; tokens are kept in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    num_colors: usize,
    pieces_per_color: usize,
    pieces: Vec<Piece>,
    tokens: Vec<Token>,
    tallies: [Tally; 2],
}

impl Board {
    /// Builds a fresh board from one row of normalized positions per color.
    /// The caller guarantees every row has `pieces_per_color` entries.
    pub(crate) fn from_rows(rows: &[Vec<Point>], pieces_per_color: usize) -> Self {
        let num_colors = rows.len();
        let pieces = rows
            .iter()
            .enumerate()
            .flat_map(|(color, row)| {
                row.iter().enumerate().map(move |(index, &position)| Piece {
                    id: PieceId((color * pieces_per_color + index) as u32),
                    color: Color(color as u8),
                    position,
                    status: CaptureStatus::Uncaptured,
                })
            })
            .collect();

        Board {
            num_colors,
            pieces_per_color,
            pieces,
            tokens: Vec::new(),
            tallies: [Tally::new(num_colors), Tally::new(num_colors)],
        }
    }

    pub fn num_colors(&self) -> usize {
        self.num_colors
    }

    pub fn pieces_per_color(&self) -> usize {
        self.pieces_per_color
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tally(&self, player: Player) -> &Tally {
        &self.tallies[player.index()]
    }

    pub fn tokens_placed_by(&self, player: Player) -> usize {
        self.tokens.iter().filter(|t| t.owner == player).count()
    }

    pub fn uncaptured(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| !p.is_captured())
    }

    pub fn uncaptured_count(&self) -> usize {
        self.uncaptured().count()
    }

    pub fn uncaptured_of_color(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.uncaptured().filter(move |p| p.color == color)
    }

    /// Everything that can block the line `a`-`b`: the other uncaptured
    /// pieces and every token.
    pub fn obstacles_excluding(&self, a: PieceId, b: PieceId) -> impl Iterator<Item = Point> + '_ {
        self.uncaptured()
            .filter(move |p| p.id != a && p.id != b)
            .map(|p| p.position)
            .chain(self.tokens.iter().map(|t| t.position))
    }

    /// Everything a new token must keep clear of.
    pub fn occupants(&self) -> impl Iterator<Item = Point> + '_ {
        self.uncaptured()
            .map(|p| p.position)
            .chain(self.tokens.iter().map(|t| t.position))
    }

    pub fn is_line_clear(&self, a: &Piece, b: &Piece, eps: f64) -> bool {
        unobstructed(a.position, b.position, self.obstacles_excluding(a.id, b.id), eps)
    }

    /// Uncaptured same-color pairs `(low id, high id)` with clear line of sight.
    pub fn unobstructed_pairs(&self, color: Color, eps: f64) -> Vec<(PieceId, PieceId)> {
        let pieces: Vec<&Piece> = self.uncaptured_of_color(color).collect();
        let mut pairs = Vec::new();
        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                if self.is_line_clear(a, b, eps) {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    /// Marks both pieces captured, credits the tally and places the token.
    /// Validation has already happened.
    pub(crate) fn capture(&mut self, a: PieceId, b: PieceId, position: Point, player: Player) -> Token {
        for id in [a, b] {
            let piece = &mut self.pieces[id.index()];
            piece.status = CaptureStatus::CapturedBy(player);
            let color = piece.color;
            self.tallies[player.index()].add(color, 1);
        }
        let token = Token {
            position,
            owner: player,
        };
        self.tokens.push(token);
        token
    }

    /// Awards each leftover piece to the owner of its nearest token,
    /// returning how many pieces changed hands.
    pub(crate) fn collect_remaining(&mut self) -> usize {
        if self.tokens.is_empty() {
            return 0;
        }
        let mut collected = 0;
        for i in 0..self.pieces.len() {
            if self.pieces[i].is_captured() {
                continue;
            }
            let position = self.pieces[i].position;
            let mut nearest = self.tokens[0];
            for token in &self.tokens[1..] {
                if token.position.distance_squared(position)
                    < nearest.position.distance_squared(position)
                {
                    nearest = *token;
                }
            }
            let color = self.pieces[i].color;
            self.pieces[i].status = CaptureStatus::CapturedBy(nearest.owner);
            self.tallies[nearest.owner.index()].add(color, 1);
            collected += 1;
        }
        collected
    }

    /// One character per piece, grouped by color: `.` uncaptured, `1`/`2`
    /// captured by that player.
    pub fn summary(&self) -> String {
        let mut result = String::new();
        for color in Color::all(self.num_colors) {
            result.push_str(&format!("{:<8}", color.name()));
            for piece in self.pieces.iter().filter(|p| p.color == color) {
                let c = match piece.status {
                    CaptureStatus::Uncaptured => '.',
                    CaptureStatus::CapturedBy(Player::One) => '1',
                    CaptureStatus::CapturedBy(Player::Two) => '2',
                };
                result.push(c);
            }
            result.push('\n');
        }
        result
    }
}
