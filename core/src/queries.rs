//! Filter-and-aggregate lookups over the catalog.

use crate::catalog::{Catalog, Item};
use crate::{Error, Result};
use serde::Serialize;
use time::{Date, Month, Weekday};

/// Titles below this vote count are not reported by [`votes_by_title`].
pub const MIN_VOTES: f64 = 2000.0;

const MONTHS: [(&str, Month); 12] = [
    ("enero", Month::January),
    ("febrero", Month::February),
    ("marzo", Month::March),
    ("abril", Month::April),
    ("mayo", Month::May),
    ("junio", Month::June),
    ("julio", Month::July),
    ("agosto", Month::August),
    ("septiembre", Month::September),
    ("octubre", Month::October),
    ("noviembre", Month::November),
    ("diciembre", Month::December),
];

const WEEKDAYS: [(&str, Weekday); 9] = [
    ("lunes", Weekday::Monday),
    ("martes", Weekday::Tuesday),
    ("miércoles", Weekday::Wednesday),
    ("miercoles", Weekday::Wednesday),
    ("jueves", Weekday::Thursday),
    ("viernes", Weekday::Friday),
    ("sábado", Weekday::Saturday),
    ("sabado", Weekday::Saturday),
    ("domingo", Weekday::Sunday),
];

pub fn parse_month(name: &str) -> Option<Month> {
    let name = name.to_lowercase();
    MONTHS.iter().find(|(n, _)| *n == name).map(|(_, m)| *m)
}

pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let name = name.to_lowercase();
    WEEKDAYS.iter().find(|(n, _)| *n == name).map(|(_, d)| *d)
}

pub fn count_by_month(catalog: &Catalog, name: &str) -> Result<usize> {
    let month = parse_month(name).ok_or_else(|| Error::InvalidInput("Mes inválido".into()))?;
    Ok(count_dates(catalog, |d| d.month() == month))
}

pub fn count_by_weekday(catalog: &Catalog, name: &str) -> Result<usize> {
    let day = parse_weekday(name).ok_or_else(|| Error::InvalidInput("Día inválido".into()))?;
    Ok(count_dates(catalog, |d| d.weekday() == day))
}

fn count_dates(catalog: &Catalog, pred: impl Fn(Date) -> bool) -> usize {
    catalog.items().iter().filter_map(|i| i.release_date).filter(|d| pred(*d)).count()
}

fn find_title<'a>(catalog: &'a Catalog, title: &str) -> Result<&'a Item> {
    let position = catalog
        .resolve_by_title_ignore_case(title)
        .map_err(|_| Error::NotFound("Título no encontrado".into()))?;
    catalog.get(position)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleScore {
    pub title: String,
    pub release_year: Option<i32>,
    pub vote_average: Option<f64>,
}

pub fn score_by_title(catalog: &Catalog, title: &str) -> Result<TitleScore> {
    let item = find_title(catalog, title)?;
    Ok(TitleScore {
        title: item.title.clone(),
        release_year: item.release_year,
        vote_average: item.vote_average,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleVotes {
    pub title: String,
    pub release_year: Option<i32>,
    pub vote_count: u64,
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VotesOutcome {
    Qualified(TitleVotes),
    BelowThreshold,
}

pub fn votes_by_title(catalog: &Catalog, title: &str) -> Result<VotesOutcome> {
    let item = find_title(catalog, title)?;
    let votes = item.vote_count.unwrap_or(0.0);
    if votes < MIN_VOTES {
        return Ok(VotesOutcome::BelowThreshold);
    }
    Ok(VotesOutcome::Qualified(TitleVotes {
        title: item.title.clone(),
        release_year: item.release_year,
        vote_count: votes as u64,
        vote_average: item.vote_average,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorStats {
    pub actor: String,
    pub films: usize,
    pub total_return: f64,
    pub average_return: f64,
}

/// Aggregates over films whose cast list contains `name` exactly.
pub fn actor_stats(catalog: &Catalog, name: &str) -> Result<ActorStats> {
    let films: Vec<&Item> = catalog
        .items()
        .iter()
        .filter(|i| i.actors.iter().any(|a| a == name))
        .collect();
    if films.is_empty() {
        return Err(Error::NotFound("Actor no encontrado".into()));
    }
    let total_return: f64 = films.iter().filter_map(|i| i.return_ratio).sum();
    Ok(ActorStats {
        actor: name.to_string(),
        films: films.len(),
        total_return,
        average_return: total_return / films.len() as f64,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectedFilm {
    pub title: String,
    #[serde(with = "crate::catalog::iso_date::option")]
    pub release_date: Option<Date>,
    #[serde(rename = "return")]
    pub return_ratio: Option<f64>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
}

/// Films whose director field contains `name`, ignoring case.
pub fn director_films(catalog: &Catalog, name: &str) -> Result<Vec<DirectedFilm>> {
    let needle = name.to_lowercase();
    let films: Vec<DirectedFilm> = catalog
        .items()
        .iter()
        .filter(|i| {
            i.director
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .map(|i| DirectedFilm {
            title: i.title.clone(),
            release_date: i.release_date,
            return_ratio: i.return_ratio,
            budget: i.budget,
            revenue: i.revenue,
        })
        .collect();
    if films.is_empty() {
        return Err(Error::NotFound("Director no encontrado".into()));
    }
    Ok(films)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn film(title: &str, released: Date, votes: f64, actors: &[&str], director: &str, ret: f64) -> Item {
        Item {
            title: title.into(),
            release_date: Some(released),
            release_year: Some(released.year()),
            vote_average: Some(7.5),
            vote_count: Some(votes),
            actors: actors.iter().map(|a| a.to_string()).collect(),
            director: Some(director.into()),
            return_ratio: Some(ret),
            budget: Some(1.0e6),
            revenue: Some(1.0e6 * ret),
            ..Item::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_items(vec![
            // 1995-10-30 was a Monday
            film("Toy Story", date!(1995 - 10 - 30), 5415.0, &["Tom Hanks", "Tim Allen"], "John Lasseter", 12.0),
            film("Jumanji", date!(1995 - 12 - 15), 2413.0, &["Robin Williams"], "Joe Johnston", 4.0),
            film("Heat", date!(1995 - 12 - 15), 1886.0, &["Al Pacino"], "Michael Mann", 1.0),
            film("Cast Away", date!(2000 - 12 - 22), 4166.0, &["Tom Hanks"], "Robert Zemeckis", 4.0),
        ])
    }

    #[test]
    fn counts_by_spanish_month() {
        let c = catalog();
        assert_eq!(count_by_month(&c, "Diciembre"), Ok(3));
        assert_eq!(count_by_month(&c, "octubre"), Ok(1));
        assert_eq!(count_by_month(&c, "march"), Err(Error::InvalidInput("Mes inválido".into())));
    }

    #[test]
    fn counts_by_spanish_weekday() {
        let c = catalog();
        assert_eq!(count_by_weekday(&c, "lunes"), Ok(1));
        assert_eq!(count_by_weekday(&c, "viernes"), Ok(3));
        assert_eq!(count_by_weekday(&c, "Miércoles"), Ok(0));
        assert!(count_by_weekday(&c, "monday").is_err());
    }

    #[test]
    fn score_lookup_ignores_case() {
        let s = score_by_title(&catalog(), "toy story").unwrap();
        assert_eq!(s.title, "Toy Story");
        assert_eq!(s.release_year, Some(1995));
        assert!(matches!(score_by_title(&catalog(), "Nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn votes_require_minimum() {
        let c = catalog();
        assert_eq!(votes_by_title(&c, "Heat"), Ok(VotesOutcome::BelowThreshold));
        match votes_by_title(&c, "Jumanji").unwrap() {
            VotesOutcome::Qualified(v) => assert_eq!(v.vote_count, 2413),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn actor_aggregates_return() {
        let stats = actor_stats(&catalog(), "Tom Hanks").unwrap();
        assert_eq!(stats.films, 2);
        assert_eq!(stats.total_return, 16.0);
        assert_eq!(stats.average_return, 8.0);
        assert!(actor_stats(&catalog(), "tom hanks").is_err());
    }

    #[test]
    fn director_matches_substring() {
        let films = director_films(&catalog(), "zemeckis").unwrap();
        assert_eq!(films.len(), 1);
        assert_eq!(films[0].title, "Cast Away");
        assert!(director_films(&catalog(), "Kubrick").is_err());
    }
}
