use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use tsify::Tsify;
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::console;

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const DEFAULT_BEST_SCORE_KEY: &str = "tetris-best";
pub const EMPTY: u8 = 0;

// Smallest board that still fits the widest and tallest shape.
const MIN_DIMENSION: usize = 4;
const LINE_POINTS: [u32; 5] = [0, 100, 300, 500, 800];
const LINES_PER_LEVEL: u32 = 10;
const BASE_DROP_INTERVAL_MS: u32 = 1000;
const DROP_INTERVAL_STEP_MS: u32 = 100;
const MIN_DROP_INTERVAL_MS: u32 = 100;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
fn log(msg: &str) {
    console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
fn log(msg: &str) {
    ::log::info!("{msg}");
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Tsify)]
pub enum Tetromino {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl Tetromino {
    pub fn all() -> [Tetromino; 7] {
        [
            Tetromino::I,
            Tetromino::O,
            Tetromino::T,
            Tetromino::S,
            Tetromino::Z,
            Tetromino::L,
            Tetromino::J,
        ]
    }

    pub fn color_id(self) -> u8 {
        match self {
            Tetromino::I => 1,
            Tetromino::O => 2,
            Tetromino::T => 3,
            Tetromino::S => 4,
            Tetromino::Z => 5,
            Tetromino::L => 6,
            Tetromino::J => 7,
        }
    }

    pub fn css_color(self) -> &'static str {
        match self {
            Tetromino::I => "#00f0f0",
            Tetromino::O => "#f0f000",
            Tetromino::T => "#a000f0",
            Tetromino::S => "#00f000",
            Tetromino::Z => "#f00000",
            Tetromino::L => "#f0a000",
            Tetromino::J => "#0000f0",
        }
    }

    pub fn matrix(self) -> Vec<Vec<u8>> {
        fn rows(rows: &[&[u8]]) -> Vec<Vec<u8>> {
            rows.iter().map(|row| row.to_vec()).collect()
        }
        match self {
            Tetromino::I => rows(&[&[1, 1, 1, 1]]),
            Tetromino::O => rows(&[&[1, 1], &[1, 1]]),
            Tetromino::T => rows(&[&[0, 1, 0], &[1, 1, 1]]),
            Tetromino::S => rows(&[&[0, 1, 1], &[1, 1, 0]]),
            Tetromino::Z => rows(&[&[1, 1, 0], &[0, 1, 1]]),
            Tetromino::L => rows(&[&[1, 0], &[1, 0], &[1, 1]]),
            Tetromino::J => rows(&[&[0, 1], &[0, 1], &[1, 1]]),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, Tsify)]
pub enum RandomizerKind {
    #[default]
    Uniform,
    SevenBag,
    Sequence { pieces: Vec<Tetromino> },
}

pub trait Randomizer {
    fn next(&mut self) -> Tetromino;
}

pub struct Uniform {
    rng: StdRng,
}

impl Uniform {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Randomizer for Uniform {
    fn next(&mut self) -> Tetromino {
        let all = Tetromino::all();
        all[self.rng.gen_range(0..all.len())]
    }
}

pub struct SevenBag {
    bag: Vec<Tetromino>,
    rng: StdRng,
}

impl SevenBag {
    pub fn new(rng: StdRng) -> Self {
        Self {
            bag: Vec::new(),
            rng,
        }
    }

    fn refill(&mut self) {
        self.bag = Tetromino::all().to_vec();
        self.bag.shuffle(&mut self.rng);
    }
}

impl Randomizer for SevenBag {
    fn next(&mut self) -> Tetromino {
        if self.bag.is_empty() {
            self.refill();
        }
        self.bag.pop().unwrap_or(Tetromino::I)
    }
}

pub struct Sequence {
    pieces: Vec<Tetromino>,
    cursor: usize,
}

impl Sequence {
    pub fn new(pieces: Vec<Tetromino>) -> Self {
        let pieces = if pieces.is_empty() {
            Tetromino::all().to_vec()
        } else {
            pieces
        };
        Self { pieces, cursor: 0 }
    }
}

impl Randomizer for Sequence {
    fn next(&mut self) -> Tetromino {
        let piece = self.pieces[self.cursor % self.pieces.len()];
        self.cursor = (self.cursor + 1) % self.pieces.len();
        piece
    }
}

pub fn randomizer_from_kind(kind: &RandomizerKind, seed: Option<u64>) -> Box<dyn Randomizer> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    match kind {
        RandomizerKind::Uniform => Box::new(Uniform::new(rng)),
        RandomizerKind::SevenBag => Box::new(SevenBag::new(rng)),
        RandomizerKind::Sequence { pieces } => Box::new(Sequence::new(pieces.clone())),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Tsify)]
pub struct Piece {
    kind: Tetromino,
    matrix: Vec<Vec<u8>>,
    color: u8,
    x: i32,
    y: i32,
}

impl Piece {
    pub fn new(kind: Tetromino, x: i32, y: i32) -> Self {
        Self {
            kind,
            matrix: kind.matrix(),
            color: kind.color_id(),
            x,
            y,
        }
    }

    pub fn spawn(kind: Tetromino, board_width: usize) -> Self {
        let shape_width = kind.matrix().first().map_or(0, Vec::len);
        let x = (board_width / 2) as i32 - (shape_width / 2) as i32;
        Self::new(kind, x, 0)
    }

    pub fn kind(&self) -> Tetromino {
        self.kind
    }

    pub fn matrix(&self) -> &[Vec<u8>] {
        &self.matrix
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> usize {
        self.matrix.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.matrix.len()
    }

    fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.matrix.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| **cell != 0)
                .map(move |(x, _)| (x as i32, y as i32))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Vec<u8>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![EMPTY; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.cells
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    pub fn set(&mut self, x: i32, y: i32, color: u8) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        match self
            .cells
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            Some(cell) => {
                *cell = color;
                true
            }
            None => false,
        }
    }

    // walls and floor count as occupied, rows above the top never do
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width as i32 {
            return true;
        }
        if y >= self.height as i32 {
            return true;
        }
        if y < 0 {
            return false;
        }
        self.cells[y as usize][x as usize] != EMPTY
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        // a zero-width row has nothing to fill
        self.width > 0
            && self
                .cells
                .get(y)
                .is_some_and(|row| row.iter().all(|&c| c != EMPTY))
    }

    pub fn merge(&mut self, piece: &Piece) {
        for (cx, cy) in piece.cells() {
            let x = piece.x + cx;
            let y = piece.y + cy;
            if y >= 0 {
                self.set(x, y, piece.color);
            }
        }
    }

    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            if self.is_row_full(y - 1) {
                self.cells.remove(y - 1);
                self.cells.insert(0, vec![EMPTY; self.width]);
                cleared += 1;
                // same index again: the row above just moved into it
            } else {
                y -= 1;
            }
        }
        cleared
    }
}

pub fn collides(piece: &Piece, board: &Board, dx: i32, dy: i32) -> bool {
    piece
        .cells()
        .any(|(cx, cy)| board.is_occupied(piece.x + cx + dx, piece.y + cy + dy))
}

pub fn shift_piece(piece: &Piece, board: &Board, direction: i32) -> Piece {
    let dx = direction.signum();
    if dx == 0 || collides(piece, board, dx, 0) {
        return piece.clone();
    }
    Piece {
        x: piece.x + dx,
        ..piece.clone()
    }
}

// clockwise: row i is column i read bottom to top
pub fn rotate_matrix(matrix: &[Vec<u8>]) -> Vec<Vec<u8>> {
    let cols = matrix.first().map_or(0, Vec::len);
    (0..cols)
        .map(|i| matrix.iter().rev().map(|row| row[i]).collect())
        .collect()
}

// Kick search tries 1, -2, 3, -4, ... and gives up once the nudge is wider than the shape.
pub fn rotate_piece(piece: &Piece, board: &Board) -> Piece {
    let mut rotated = Piece {
        matrix: rotate_matrix(&piece.matrix),
        ..piece.clone()
    };
    let limit = rotated.width() as i32;
    let mut offset = 0;
    while collides(&rotated, board, offset, 0) {
        offset = if offset > 0 { -(offset + 1) } else { -offset + 1 };
        if offset.abs() > limit {
            return piece.clone();
        }
    }
    rotated.x += offset;
    rotated
}

pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

pub fn drop_interval_ms(level: u32) -> u32 {
    BASE_DROP_INTERVAL_MS
        .saturating_sub(level.saturating_sub(1).saturating_mul(DROP_INTERVAL_STEP_MS))
        .max(MIN_DROP_INTERVAL_MS)
}

pub fn line_points(lines: u32) -> u32 {
    LINE_POINTS[(lines as usize).min(LINE_POINTS.len() - 1)]
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Tsify)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Tsify)]
#[serde(default)]
pub struct ControlBindings {
    pub move_left: String,
    pub move_right: String,
    pub soft_drop: String,
    pub hard_drop: String,
    pub rotate: String,
}

impl Default for ControlBindings {
    fn default() -> Self {
        Self {
            move_left: "ArrowLeft".to_string(),
            move_right: "ArrowRight".to_string(),
            soft_drop: "ArrowDown".to_string(),
            hard_drop: " ".to_string(),
            rotate: "ArrowUp".to_string(),
        }
    }
}

impl ControlBindings {
    pub fn command_for(&self, key: &str) -> Option<Command> {
        [
            (&self.move_left, Command::MoveLeft),
            (&self.move_right, Command::MoveRight),
            (&self.soft_drop, Command::SoftDrop),
            (&self.hard_drop, Command::HardDrop),
            (&self.rotate, Command::Rotate),
        ]
        .into_iter()
        .find(|(binding, _)| binding.as_str() == key)
        .map(|(_, command)| command)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Tsify)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
    pub randomizer: RandomizerKind,
    pub bindings: ControlBindings,
    pub best_score_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            randomizer: RandomizerKind::default(),
            bindings: ControlBindings::default(),
            best_score_key: DEFAULT_BEST_SCORE_KEY.to_string(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: GameConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_dimensions(self.width, self.height)
    }
}

fn validate_dimensions(width: usize, height: usize) -> Result<(), String> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(format!(
            "board must be at least {MIN_DIMENSION}x{MIN_DIMENSION}, got {width}x{height}"
        ));
    }
    Ok(())
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

// `score` is set whenever the piece landed.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DropOutcome {
    pub landed: bool,
    pub lines_cleared: u32,
    pub score: Option<ScoreUpdate>,
    pub game_over: bool,
}

#[derive(Serialize, Debug, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    pub id: u8,
    pub color: String,
}

#[derive(Serialize, Debug, Tsify)]
#[serde(rename_all = "camelCase")]
pub struct FrameView {
    pub width: usize,
    pub height: usize,
    pub board: Vec<Vec<u8>>,
    pub active: Piece,
    pub next: Piece,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_interval_ms: u32,
    pub running: bool,
    pub game_over: bool,
    pub palette: Vec<PaletteEntry>,
}

pub struct Session {
    board: Board,
    current: Piece,
    next: Piece,
    randomizer: Box<dyn Randomizer>,
    score: u32,
    lines: u32,
    level: u32,
    drop_accum_ms: f32,
    running: bool,
    game_over: bool,
}

impl Session {
    pub fn new(config: &GameConfig) -> Result<Self, String> {
        config.validate()?;
        let randomizer = randomizer_from_kind(&config.randomizer, config.seed);
        Self::with_randomizer(config.width, config.height, randomizer)
    }

    pub fn with_randomizer(
        width: usize,
        height: usize,
        mut randomizer: Box<dyn Randomizer>,
    ) -> Result<Self, String> {
        validate_dimensions(width, height)?;
        let current = Piece::spawn(randomizer.next(), width);
        let next = Piece::spawn(randomizer.next(), width);
        Ok(Self {
            board: Board::new(width, height),
            current,
            next,
            randomizer,
            score: 0,
            lines: 0,
            level: 1,
            drop_accum_ms: 0.0,
            running: true,
            game_over: false,
        })
    }

    // the shape stream carries on across resets
    pub fn reset(&mut self) {
        self.board = Board::new(self.board.width, self.board.height);
        self.current = self.spawn();
        self.next = self.spawn();
        self.score = 0;
        self.lines = 0;
        self.level = 1;
        self.drop_accum_ms = 0.0;
        self.running = true;
        self.game_over = false;
        log("session reset");
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn drop_interval_ms(&self) -> u32 {
        drop_interval_ms(self.level)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn apply(&mut self, command: Command) -> Option<DropOutcome> {
        if !self.running {
            return None;
        }
        match command {
            Command::MoveLeft => {
                self.move_left();
                None
            }
            Command::MoveRight => {
                self.move_right();
                None
            }
            Command::Rotate => {
                self.rotate();
                None
            }
            Command::SoftDrop => Some(self.fall()),
            Command::HardDrop => Some(self.hard_drop()),
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    fn try_shift(&mut self, dir: i32) -> bool {
        if !self.running {
            return false;
        }
        let moved = shift_piece(&self.current, &self.board, dir);
        let changed = moved.x != self.current.x;
        self.current = moved;
        changed
    }

    pub fn rotate(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let rotated = rotate_piece(&self.current, &self.board);
        let changed = rotated != self.current;
        self.current = rotated;
        changed
    }

    pub fn fall(&mut self) -> DropOutcome {
        if !self.running {
            return DropOutcome::default();
        }
        self.drop_accum_ms = 0.0;
        if !collides(&self.current, &self.board, 0, 1) {
            self.current.y += 1;
            return DropOutcome::default();
        }
        self.land()
    }

    pub fn hard_drop(&mut self) -> DropOutcome {
        if !self.running {
            return DropOutcome::default();
        }
        let max_rows = self.board.height + self.current.height();
        for _ in 0..max_rows {
            if collides(&self.current, &self.board, 0, 1) {
                break;
            }
            self.current.y += 1;
        }
        self.fall()
    }

    /// Feeds elapsed frame time to gravity. At most one drop happens per call.
    pub fn advance(&mut self, elapsed_ms: f32) -> Option<DropOutcome> {
        if !self.running {
            return None;
        }
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.drop_accum_ms += elapsed_ms;
        }
        if self.drop_accum_ms > self.drop_interval_ms() as f32 {
            Some(self.fall())
        } else {
            None
        }
    }

    fn spawn(&mut self) -> Piece {
        Piece::spawn(self.randomizer.next(), self.board.width)
    }

    fn land(&mut self) -> DropOutcome {
        self.board.merge(&self.current);
        let cleared = self.board.clear_lines();
        let update = self.award(cleared);

        let fresh = self.spawn();
        self.current = std::mem::replace(&mut self.next, fresh);
        if collides(&self.current, &self.board, 0, 0) {
            self.running = false;
            self.game_over = true;
            log(&format!("game over, final score {}", self.score));
        }

        DropOutcome {
            landed: true,
            lines_cleared: cleared,
            score: Some(update),
            game_over: self.game_over,
        }
    }

    fn award(&mut self, cleared: u32) -> ScoreUpdate {
        if cleared > 0 {
            self.lines = self.lines.saturating_add(cleared);
            let points = line_points(cleared).saturating_mul(self.level);
            self.score = self.score.saturating_add(points);
            self.level = level_for_lines(self.lines);
        }
        ScoreUpdate {
            score: self.score,
            lines: self.lines,
            level: self.level,
        }
    }

    pub fn snapshot(&self) -> FrameView {
        FrameView {
            width: self.board.width,
            height: self.board.height,
            board: self.board.cells.clone(),
            active: self.current.clone(),
            next: self.next.clone(),
            score: self.score,
            lines: self.lines,
            level: self.level,
            drop_interval_ms: self.drop_interval_ms(),
            running: self.running,
            game_over: self.game_over,
            palette: Tetromino::all()
                .iter()
                .map(|t| PaletteEntry {
                    id: t.color_id(),
                    color: t.css_color().to_string(),
                })
                .collect(),
        }
    }
}

// The engine never touches storage; the host owns the best score.
pub trait ScoreStore {
    fn load(&self) -> u32;
    fn save(&mut self, best: u32);
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    best: u32,
}

impl MemoryStore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.best
    }

    fn save(&mut self, best: u32) {
        self.best = best;
    }
}

#[cfg(target_arch = "wasm32")]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageStore {
    fn load(&self) -> u32 {
        Self::storage()
            .and_then(|s| s.get_item(&self.key).ok().flatten())
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    fn save(&mut self, best: u32) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(&self.key, &best.to_string()).is_err() {
                    log("could not persist best score");
                }
            }
            None => log("localStorage unavailable, best score not persisted"),
        }
    }
}

pub struct BestScore<S: ScoreStore> {
    store: S,
    best: u32,
}

impl<S: ScoreStore> BestScore<S> {
    pub fn load(store: S) -> Self {
        let best = store.load();
        Self { store, best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        self.store.save(score);
        log(&format!("new best score {score}"));
        true
    }
}


#[cfg(target_arch = "wasm32")]
type HostStore = LocalStorageStore;
#[cfg(not(target_arch = "wasm32"))]
type HostStore = MemoryStore;

#[cfg(target_arch = "wasm32")]
fn host_store(key: &str) -> HostStore {
    LocalStorageStore::new(key)
}

#[cfg(not(target_arch = "wasm32"))]
fn host_store(_key: &str) -> HostStore {
    MemoryStore::default()
}

fn js_error(msg: &str) -> JsValue {
    js_sys::Error::new(msg).into()
}

#[wasm_bindgen]
pub struct GameClient {
    session: Session,
    bindings: ControlBindings,
    best: BestScore<HostStore>,
}

#[wasm_bindgen]
impl GameClient {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<GameClient, JsValue> {
        let config: GameConfig = from_value(config).unwrap_or_default();
        let session = Session::new(&config).map_err(|e| js_error(&e))?;
        let best = BestScore::load(host_store(&config.best_score_key));
        Ok(Self {
            session,
            bindings: config.bindings,
            best,
        })
    }

    pub fn start(&mut self) {
        self.session.reset();
    }

    /// Returns true when the key is bound, so the page can suppress its default action.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str) -> bool {
        let Some(command) = self.bindings.command_for(key) else {
            return false;
        };
        let outcome = self.session.apply(command);
        self.observe(outcome);
        true
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self, dt_ms: f32) -> Result<JsValue, JsValue> {
        let outcome = self.session.advance(dt_ms);
        self.observe(outcome);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.snapshot()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(|e| js_error(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn best(&self) -> u32 {
        self.best.best()
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.session.is_running()
    }

    #[wasm_bindgen(getter, js_name = gameOver)]
    pub fn game_over(&self) -> bool {
        self.session.is_game_over()
    }
}

impl GameClient {
    fn observe(&mut self, outcome: Option<DropOutcome>) {
        if let Some(outcome) = outcome {
            if outcome.game_over {
                self.best.record(self.session.score());
            }
        }
    }
}
