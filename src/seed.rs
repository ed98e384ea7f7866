//! Fixture match data.
//!
//! Ten matches across five leagues. Kickoff instants are derived from
//! the boot instant so the time-derived clock is meaningful at startup:
//! live fixtures kicked off minutes ago (consistent with their event
//! histories), scheduled ones are still ahead, finished ones are days
//! back. Seed scores always equal the goal tally of the seeded events.

use crate::models::{EventKind, Match, MatchEvent, MatchStatus};
use chrono::{DateTime, Duration, Utc};

fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn event(minute: u8, team: &str, player: &str, kind: EventKind) -> MatchEvent {
    MatchEvent {
        minute,
        team: team.to_string(),
        player: player.to_string(),
        kind,
    }
}

/// Build the full fixture set relative to `now`.
pub fn fixture_matches(now: DateTime<Utc>) -> Vec<Match> {
    vec![
        Match {
            id: 1,
            league: "Premier League".to_string(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            home_roster: roster(&[
                "Bukayo Saka",
                "Declan Rice",
                "Gabriel Martinelli",
                "Martin Ødegaard",
                "Kai Havertz",
                "William Saliba",
            ]),
            away_roster: roster(&[
                "Raheem Sterling",
                "Moisés Caicedo",
                "Cole Palmer",
                "Nicolas Jackson",
                "Enzo Fernández",
            ]),
            home_score: 2,
            away_score: 1,
            kickoff_time: now - Duration::minutes(76),
            status: MatchStatus::Live,
            events: vec![
                event(23, "Arsenal", "Bukayo Saka", EventKind::Goal),
                event(45, "Chelsea", "Raheem Sterling", EventKind::Goal),
                event(53, "Arsenal", "Declan Rice", EventKind::YellowCard),
                event(70, "Arsenal", "Gabriel Martinelli", EventKind::Goal),
                event(
                    75,
                    "Chelsea",
                    "Moisés Caicedo",
                    EventKind::Substitution {
                        sub_in: "Enzo Fernández".to_string(),
                    },
                ),
            ],
        },
        Match {
            id: 2,
            league: "Premier League".to_string(),
            home_team: "Manchester City".to_string(),
            away_team: "Liverpool".to_string(),
            home_roster: roster(&[
                "Erling Haaland",
                "Phil Foden",
                "Kevin De Bruyne",
                "Bernardo Silva",
                "Rodri",
            ]),
            away_roster: roster(&[
                "Darwin Núñez",
                "Mohamed Salah",
                "Virgil van Dijk",
                "Luis Díaz",
                "Alexis Mac Allister",
            ]),
            home_score: 3,
            away_score: 2,
            kickoff_time: now - Duration::days(7),
            status: MatchStatus::Finished,
            events: vec![
                event(11, "Manchester City", "Erling Haaland", EventKind::Goal),
                event(27, "Liverpool", "Darwin Núñez", EventKind::Goal),
                event(42, "Manchester City", "Phil Foden", EventKind::Goal),
                event(56, "Liverpool", "Mohamed Salah", EventKind::Goal),
                event(89, "Manchester City", "Kevin De Bruyne", EventKind::Goal),
            ],
        },
        Match {
            id: 3,
            league: "La Liga".to_string(),
            home_team: "Barcelona".to_string(),
            away_team: "Real Madrid".to_string(),
            home_roster: roster(&[
                "Robert Lewandowski",
                "Lamine Yamal",
                "Pedri",
                "Raphinha",
                "Frenkie de Jong",
            ]),
            away_roster: roster(&[
                "Vinícius Júnior",
                "Jude Bellingham",
                "Rodrygo",
                "Federico Valverde",
                "Luka Modrić",
            ]),
            home_score: 0,
            away_score: 0,
            kickoff_time: now + Duration::hours(2),
            status: MatchStatus::Scheduled,
            events: vec![],
        },
        Match {
            id: 4,
            league: "La Liga".to_string(),
            home_team: "Real Sociedad".to_string(),
            away_team: "Atlético Madrid".to_string(),
            home_roster: roster(&[
                "Takefusa Kubo",
                "Mikel Merino",
                "Mikel Oyarzabal",
                "Brais Méndez",
                "Martín Zubimendi",
            ]),
            away_roster: roster(&[
                "Álvaro Morata",
                "Antoine Griezmann",
                "Jan Oblak",
                "Koke",
                "Marcos Llorente",
            ]),
            home_score: 1,
            away_score: 1,
            kickoff_time: now - Duration::days(6),
            status: MatchStatus::Finished,
            events: vec![
                event(5, "Atlético Madrid", "Álvaro Morata", EventKind::Goal),
                event(61, "Real Sociedad", "Takefusa Kubo", EventKind::Goal),
                event(75, "Real Sociedad", "Mikel Merino", EventKind::YellowCard),
            ],
        },
        Match {
            id: 5,
            league: "Serie A".to_string(),
            home_team: "Inter".to_string(),
            away_team: "AC Milan".to_string(),
            home_roster: roster(&[
                "Lautaro Martínez",
                "Nicolò Barella",
                "Hakan Çalhanoğlu",
                "Marcus Thuram",
                "Alessandro Bastoni",
            ]),
            away_roster: roster(&[
                "Rafael Leão",
                "Christian Pulisic",
                "Theo Hernández",
                "Tijjani Reijnders",
                "Mike Maignan",
            ]),
            home_score: 0,
            away_score: 1,
            kickoff_time: now - Duration::minutes(35),
            status: MatchStatus::Live,
            events: vec![
                event(14, "Inter", "Lautaro Martínez", EventKind::YellowCard),
                event(33, "AC Milan", "Rafael Leão", EventKind::Goal),
            ],
        },
        Match {
            id: 6,
            league: "Serie A".to_string(),
            home_team: "Juventus".to_string(),
            away_team: "Roma".to_string(),
            home_roster: roster(&[
                "Dušan Vlahović",
                "Federico Chiesa",
                "Kenan Yıldız",
                "Manuel Locatelli",
                "Bremer",
            ]),
            away_roster: roster(&[
                "Paulo Dybala",
                "Romelu Lukaku",
                "Lorenzo Pellegrini",
                "Gianluca Mancini",
                "Bryan Cristante",
            ]),
            home_score: 0,
            away_score: 0,
            kickoff_time: now + Duration::hours(26),
            status: MatchStatus::Scheduled,
            events: vec![],
        },
        Match {
            id: 7,
            league: "Bundesliga".to_string(),
            home_team: "Bayern Munich".to_string(),
            away_team: "Borussia Dortmund".to_string(),
            home_roster: roster(&[
                "Harry Kane",
                "Jamal Musiala",
                "Kingsley Coman",
                "Thomas Müller",
                "Joshua Kimmich",
            ]),
            away_roster: roster(&[
                "Marco Reus",
                "Niclas Füllkrug",
                "Julian Brandt",
                "Karim Adeyemi",
                "Gregor Kobel",
            ]),
            home_score: 4,
            away_score: 2,
            kickoff_time: now - Duration::days(8),
            status: MatchStatus::Finished,
            events: vec![
                event(7, "Bayern Munich", "Harry Kane", EventKind::Goal),
                event(22, "Borussia Dortmund", "Marco Reus", EventKind::Goal),
                event(35, "Bayern Munich", "Jamal Musiala", EventKind::Goal),
                event(50, "Bayern Munich", "Kingsley Coman", EventKind::Goal),
                event(78, "Borussia Dortmund", "Niclas Füllkrug", EventKind::Goal),
                event(90, "Bayern Munich", "Thomas Müller", EventKind::Goal),
            ],
        },
        Match {
            id: 8,
            league: "Bundesliga".to_string(),
            home_team: "Bayer Leverkusen".to_string(),
            away_team: "RB Leipzig".to_string(),
            home_roster: roster(&[
                "Florian Wirtz",
                "Victor Boniface",
                "Granit Xhaka",
                "Jeremie Frimpong",
                "Jonathan Tah",
            ]),
            away_roster: roster(&[
                "Loïs Openda",
                "Xavi Simons",
                "Benjamin Šeško",
                "Dani Olmo",
                "Willi Orbán",
            ]),
            home_score: 1,
            away_score: 1,
            kickoff_time: now - Duration::minutes(45),
            status: MatchStatus::Live,
            events: vec![
                event(17, "RB Leipzig", "Loïs Openda", EventKind::Goal),
                event(44, "Bayer Leverkusen", "Florian Wirtz", EventKind::Goal),
            ],
        },
        Match {
            id: 9,
            league: "Ligue 1".to_string(),
            home_team: "Paris Saint-Germain".to_string(),
            away_team: "Marseille".to_string(),
            home_roster: roster(&[
                "Kylian Mbappé",
                "Ousmane Dembélé",
                "Achraf Hakimi",
                "Vitinha",
                "Marquinhos",
            ]),
            away_roster: roster(&[
                "Jonathan Clauss",
                "Pierre-Emerick Aubameyang",
                "Jordan Veretout",
                "Samuel Gigot",
                "Pau López",
            ]),
            home_score: 2,
            away_score: 0,
            kickoff_time: now - Duration::days(9),
            status: MatchStatus::Finished,
            events: vec![
                event(31, "Paris Saint-Germain", "Kylian Mbappé", EventKind::Goal),
                event(61, "Paris Saint-Germain", "Ousmane Dembélé", EventKind::Goal),
                event(75, "Marseille", "Jonathan Clauss", EventKind::RedCard),
            ],
        },
        Match {
            id: 10,
            league: "Ligue 1".to_string(),
            home_team: "Lyon".to_string(),
            away_team: "Nice".to_string(),
            home_roster: roster(&[
                "Alexandre Lacazette",
                "Rayan Cherki",
                "Corentin Tolisso",
                "Maxence Caqueret",
                "Anthony Lopes",
            ]),
            away_roster: roster(&[
                "Terem Moffi",
                "Gaëtan Laborde",
                "Khéphren Thuram",
                "Dante",
                "Marcin Bułka",
            ]),
            home_score: 0,
            away_score: 0,
            kickoff_time: now + Duration::hours(3),
            status: MatchStatus::Scheduled,
            events: vec![],
        },
    ]
}
