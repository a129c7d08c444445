
pub const SQL_TABLEN_MNT : &str = "mountains";
// CAREFUL: other tables reference mountains/expeditions tables BY NAME!
// PRIMARY implies NOT NULL and UNIQUE
pub const SQL_CREATE_MNT : &str =
"CREATE TABLE mountains (
    rank INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    country TEXT NOT NULL,
    height INTEGER NOT NULL,
    prominence INTEGER NOT NULL,
    range TEXT NOT NULL
    )";

pub const SQL_TABLEN_EXP : &str = "expeditions";
pub const SQL_CREATE_EXP : &str =
"CREATE TABLE expeditions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    mountain_id INTEGER NOT NULL,
    start_location TEXT NOT NULL,
    date TEXT NOT NULL,
    country TEXT NOT NULL,
    duration INTEGER NOT NULL CHECK (duration >= 0),
    success INTEGER NOT NULL,
    FOREIGN KEY (mountain_id) REFERENCES mountains(rank)
    )";

pub const SQL_TABLEN_CLB : &str = "climbers";
pub const SQL_CREATE_CLB : &str =
"CREATE TABLE climbers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    nationality TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    expedition_id INTEGER NOT NULL,
    FOREIGN KEY (expedition_id) REFERENCES expeditions(id)
    )";

/*
 * column lists in the order the row mappers in helpers.rs expect them;
 * keep both in synch
 */
pub const SQL_COLS_MNT : &str =
    "rank, name, country, height, prominence, range";
pub const SQL_COLS_EXP : &str =
    "id, name, mountain_id, start_location, date, country, duration, success";
pub const SQL_COLS_CLB : &str =
    "id, first_name, last_name, nationality, date_of_birth, expedition_id";
