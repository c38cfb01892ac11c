use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::Float8;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use hotsox_shared::clients::db::DbConn;
use hotsox_shared::errors::{AppError, AppResult, ErrorCode};

use crate::domain::geo::haversine_km;
use crate::domain::match_state::{should_create_match, MatchState};
use crate::models::{NewSockLike, NewUserMatch, Sock, SockLike, SockProfilePicture, User, UserMatch};
use crate::schema::{message_chats, sock_likes, socks, user_matches, users};
use crate::services::{sock_service, user_service};
use crate::services::user_service::UserCard;

#[derive(Debug, Serialize)]
pub struct SwipeOutcome {
    pub liked: bool,
    pub matched: bool,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub user_match: Option<UserMatch>,
}

#[derive(Debug, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub sock: Sock,
    pub pictures: Vec<SockProfilePicture>,
    pub owner: UserCard,
}

#[derive(Debug, Serialize)]
pub struct MatchEntry {
    pub user: UserCard,
    pub matched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MatchList {
    pub matches: Vec<MatchEntry>,
    pub unmatched: Vec<MatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct MatchDetails {
    pub user: UserCard,
    pub state: MatchState,
    pub distance_km: f64,
    pub matched_at: DateTime<Utc>,
}

/// Match rows between two users, in either direction.
pub fn pair_rows(conn: &mut DbConn, a: Uuid, b: Uuid) -> AppResult<Vec<UserMatch>> {
    Ok(user_matches::table
        .filter(
            user_matches::user_id
                .eq(a)
                .and(user_matches::other_id.eq(b))
                .or(user_matches::user_id.eq(b).and(user_matches::other_id.eq(a))),
        )
        .order(user_matches::created_at.asc())
        .load::<UserMatch>(conn)?)
}

fn liked_swipe_between(conn: &mut DbConn, a: Uuid, b: Uuid) -> AppResult<bool> {
    let a_socks: Vec<Uuid> = socks::table
        .filter(socks::user_id.eq(a))
        .select(socks::id)
        .load(conn)?;
    let b_socks: Vec<Uuid> = socks::table
        .filter(socks::user_id.eq(b))
        .select(socks::id)
        .load(conn)?;

    let count: i64 = sock_likes::table
        .filter(sock_likes::liked.eq(true))
        .filter(
            sock_likes::sock_id
                .eq_any(&a_socks)
                .and(sock_likes::like_id.eq_any(&b_socks))
                .or(sock_likes::sock_id.eq_any(&b_socks).and(sock_likes::like_id.eq_any(&a_socks))),
        )
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

pub fn pair_state(conn: &mut DbConn, a: Uuid, b: Uuid) -> AppResult<Option<MatchState>> {
    let rows = pair_rows(conn, a, b)?;
    let liked = if rows.is_empty() { liked_swipe_between(conn, a, b)? } else { false };
    Ok(MatchState::derive(rows.iter().map(|r| r.unmatched), liked))
}

/// Records `my_sock`'s swipe on `other_sock_id` and creates a match when the
/// like is mutual and the two users were never unmatched.
pub fn swipe(
    conn: &mut DbConn,
    user_id: Uuid,
    my_sock: &Sock,
    other_sock_id: Uuid,
    liked: bool,
) -> AppResult<SwipeOutcome> {
    let other_sock = sock_service::find_sock(conn, other_sock_id)?;
    if other_sock.id == my_sock.id || other_sock.user_id == user_id {
        return Err(AppError::new(ErrorCode::CannotSwipeOwnSock, "you cannot swipe your own socks"));
    }

    let outcome = conn.transaction::<_, AppError, _>(|conn| {
        // Opposite swipes on the same pair queue up here, so the later one
        // always sees the earlier like.
        let _locked: Vec<Uuid> = socks::table
            .filter(socks::id.eq_any(vec![my_sock.id, other_sock.id]))
            .order(socks::id.asc())
            .select(socks::id)
            .for_no_key_update()
            .load(conn)?;

        let already = sock_likes::table
            .filter(sock_likes::sock_id.eq(my_sock.id))
            .filter(sock_likes::like_id.eq(other_sock.id))
            .first::<SockLike>(conn)
            .optional()?;
        if already.is_some() {
            return Err(AppError::new(ErrorCode::AlreadySwiped, "this sock was already swiped"));
        }

        diesel::insert_into(sock_likes::table)
            .values(&NewSockLike {
                sock_id: my_sock.id,
                like_id: other_sock.id,
                liked,
            })
            .execute(conn)?;

        let reverse_liked = if liked {
            sock_likes::table
                .filter(sock_likes::sock_id.eq(other_sock.id))
                .filter(sock_likes::like_id.eq(my_sock.id))
                .filter(sock_likes::liked.eq(true))
                .count()
                .get_result::<i64>(conn)?
                > 0
        } else {
            false
        };

        let state = pair_state(conn, user_id, other_sock.user_id)?;
        if !should_create_match(liked, reverse_liked, state) {
            return Ok(SwipeOutcome { liked, matched: false, user_match: None });
        }

        let user_match = diesel::insert_into(user_matches::table)
            .values(&NewUserMatch {
                user_id,
                other_id: other_sock.user_id,
                sock_id: Some(my_sock.id),
                other_sock_id: Some(other_sock.id),
            })
            .get_result::<UserMatch>(conn)?;

        Ok(SwipeOutcome { liked, matched: true, user_match: Some(user_match) })
    })?;

    metrics::counter!("hotsox_swipes_total", "liked" => liked.to_string()).increment(1);
    if outcome.matched {
        metrics::counter!("hotsox_matches_total").increment(1);
        tracing::info!(
            user_id = %user_id,
            other_id = %other_sock.user_id,
            sock_id = %my_sock.id,
            other_sock_id = %other_sock.id,
            "match created"
        );
    }

    Ok(outcome)
}

fn unmatched_partners(conn: &mut DbConn, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let rows = user_matches::table
        .filter(user_matches::user_id.eq(user_id).or(user_matches::other_id.eq(user_id)))
        .filter(user_matches::unmatched.eq(true))
        .select((user_matches::user_id, user_matches::other_id))
        .load::<(Uuid, Uuid)>(conn)?;
    Ok(rows
        .into_iter()
        .map(|(a, b)| if a == user_id { b } else { a })
        .collect())
}

/// A random sock `my_sock` has not swiped yet, from users who are neither the
/// caller nor unmatched with the caller.
pub fn next_candidate(conn: &mut DbConn, user_id: Uuid, my_sock: &Sock) -> AppResult<Option<Candidate>> {
    let swiped: Vec<Uuid> = sock_likes::table
        .filter(sock_likes::sock_id.eq(my_sock.id))
        .select(sock_likes::like_id)
        .load(conn)?;
    let excluded_users = unmatched_partners(conn, user_id)?;

    let sock = socks::table
        .filter(socks::user_id.ne(user_id))
        .filter(socks::id.ne_all(&swiped))
        .filter(socks::user_id.ne_all(&excluded_users))
        .order(diesel::dsl::sql::<Float8>("RANDOM()"))
        .first::<Sock>(conn)
        .optional()?;

    let Some(sock) = sock else {
        return Ok(None);
    };

    let pictures = sock_service::sock_pictures(conn, sock.id)?;
    let owner = user_service::find_by_id(conn, sock.user_id)?;
    let owner = user_service::public_card(conn, &owner)?;
    Ok(Some(Candidate { sock, pictures, owner }))
}

pub fn list_matches(conn: &mut DbConn, user_id: Uuid) -> AppResult<MatchList> {
    let rows = user_matches::table
        .filter(user_matches::user_id.eq(user_id).or(user_matches::other_id.eq(user_id)))
        .order(user_matches::created_at.asc())
        .load::<UserMatch>(conn)?;

    // one entry per partner; any flagged row makes the partner unmatched
    let mut by_partner: BTreeMap<Uuid, (DateTime<Utc>, Option<DateTime<Utc>>)> = BTreeMap::new();
    for row in &rows {
        let partner = if row.user_id == user_id { row.other_id } else { row.user_id };
        let entry = by_partner.entry(partner).or_insert((row.created_at, None));
        if row.unmatched {
            entry.1 = entry.1.or(row.unmatched_at).or(Some(row.created_at));
        }
    }

    let partner_ids: Vec<Uuid> = by_partner.keys().copied().collect();
    let partners = users::table
        .filter(users::id.eq_any(&partner_ids))
        .order(users::username.asc())
        .load::<User>(conn)?;
    let cards = user_service::public_cards(conn, &partners)?;

    let mut list = MatchList { matches: Vec::new(), unmatched: Vec::new() };
    for card in cards {
        let Some((matched_at, unmatched_at)) = by_partner.get(&card.id).copied() else {
            continue;
        };
        let entry = MatchEntry { user: card, matched_at, unmatched_at };
        if entry.unmatched_at.is_some() {
            list.unmatched.push(entry);
        } else {
            list.matches.push(entry);
        }
    }
    Ok(list)
}

pub fn match_details(conn: &mut DbConn, me: &User, other_username: &str) -> AppResult<MatchDetails> {
    let other = user_service::find_by_username(conn, other_username)?;
    let rows = pair_rows(conn, me.id, other.id)?;
    let first = rows
        .first()
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, format!("you have no match with {other_username}")))?;
    let matched_at = first.created_at;
    let state = MatchState::derive(rows.iter().map(|r| r.unmatched), true).unwrap_or(MatchState::Matched);

    let distance_km = haversine_km(
        me.location_latitude,
        me.location_longitude,
        other.location_latitude,
        other.location_longitude,
    );
    let user = user_service::public_card(conn, &other)?;

    Ok(MatchDetails { user, state, distance_km, matched_at })
}

/// Flags every match row of the pair and deletes their chat history in one
/// transaction. Returns the former partner so the caller can notify both sides.
pub fn unmatch(conn: &mut DbConn, me: &User, other_username: &str) -> AppResult<User> {
    let other = user_service::find_by_username(conn, other_username)?;

    let deleted_chats = conn.transaction::<_, AppError, _>(|conn| {
        let rows = pair_rows(conn, me.id, other.id)?;
        if rows.is_empty() {
            return Err(AppError::new(
                ErrorCode::MatchNotFound,
                format!("you have no match with {other_username}"),
            ));
        }
        if rows.iter().any(|r| r.unmatched) {
            return Err(AppError::new(
                ErrorCode::AlreadyUnmatched,
                format!("you already unmatched with {other_username}"),
            ));
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        diesel::update(user_matches::table.filter(user_matches::id.eq_any(&ids)))
            .set((
                user_matches::unmatched.eq(true),
                user_matches::unmatched_at.eq(Some(Utc::now())),
            ))
            .execute(conn)?;

        let deleted = diesel::delete(
            message_chats::table.filter(
                message_chats::user_id
                    .eq(me.id)
                    .and(message_chats::other_id.eq(other.id))
                    .or(message_chats::user_id.eq(other.id).and(message_chats::other_id.eq(me.id))),
            ),
        )
        .execute(conn)?;
        Ok(deleted)
    })?;

    metrics::counter!("hotsox_unmatches_total").increment(1);
    tracing::info!(
        user_id = %me.id,
        other_id = %other.id,
        deleted_chats,
        "pair unmatched"
    );

    Ok(other)
}

/// These run against a migrated Postgres named by `DATABASE_URL`
/// (`diesel migration run`, then `cargo test -- --ignored`).
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hotsox_shared::clients::db::{self, DbPool};
    use std::sync::Barrier;

    use crate::models::{NewMessageChat, NewSock, NewUser};

    fn pool(size: u32) -> DbPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a migrated database");
        db::create_pool(&url, size).expect("database pool")
    }

    fn test_conn() -> DbConn {
        let mut conn = db::connection(&pool(1)).unwrap();
        conn.begin_test_transaction().unwrap();
        conn
    }

    fn insert_user(conn: &mut DbConn, tag: &str) -> User {
        let suffix = Uuid::new_v4().simple().to_string();
        diesel::insert_into(users::table)
            .values(&NewUser {
                username: format!("{tag}_{}", &suffix[..12]),
                email: format!("{tag}_{suffix}@example.com"),
                password_hash: "not-a-real-hash".into(),
                first_name: "Test".into(),
                last_name: "User".into(),
                info_about: String::new(),
                info_birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                info_gender: "diverse".into(),
                info_gender_preference: "everyone".into(),
                location_city: "Berlin".into(),
                notification: false,
            })
            .get_result(conn)
            .unwrap()
    }

    fn insert_sock(conn: &mut DbConn, owner: &User, name: &str) -> Sock {
        diesel::insert_into(socks::table)
            .values(&NewSock {
                user_id: owner.id,
                info_name: name.into(),
                info_about: String::new(),
                info_color: "red".into(),
                info_fabric: "wool".into(),
                info_fabric_thickness: "thick".into(),
                info_brand: String::new(),
                info_type: "crew".into(),
                info_size: "m".into(),
                info_age: 2,
                info_separation_date: None,
                info_condition: "used".into(),
                info_holes: 0,
                info_kilometers: 10,
                info_inoutdoor: "both".into(),
                info_washed: 5,
                info_special: String::new(),
            })
            .get_result(conn)
            .unwrap()
    }

    fn chat(conn: &mut DbConn, from: &User, to: &User, message: &str) {
        diesel::insert_into(message_chats::table)
            .values(&NewMessageChat {
                user_id: from.id,
                other_id: to.id,
                message: message.into(),
            })
            .execute(conn)
            .unwrap();
    }

    fn chats_between(conn: &mut DbConn, a: &User, b: &User) -> i64 {
        message_chats::table
            .filter(
                message_chats::user_id
                    .eq(a.id)
                    .and(message_chats::other_id.eq(b.id))
                    .or(message_chats::user_id.eq(b.id).and(message_chats::other_id.eq(a.id))),
            )
            .count()
            .get_result(conn)
            .unwrap()
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn mutual_like_creates_match_and_repeat_swipe_conflicts() {
        let mut conn = test_conn();
        let alice = insert_user(&mut conn, "alice");
        let bob = insert_user(&mut conn, "bob");
        let red = insert_sock(&mut conn, &alice, "Red");
        let blue = insert_sock(&mut conn, &bob, "Blue");

        let first = swipe(&mut conn, alice.id, &red, blue.id, true).unwrap();
        assert!(!first.matched);
        assert_eq!(pair_state(&mut conn, alice.id, bob.id).unwrap(), Some(MatchState::PendingSwipe));

        let second = swipe(&mut conn, bob.id, &blue, red.id, true).unwrap();
        assert!(second.matched);
        assert_eq!(pair_state(&mut conn, alice.id, bob.id).unwrap(), Some(MatchState::Matched));

        let err = swipe(&mut conn, alice.id, &red, blue.id, true).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::AlreadySwiped));

        let err = swipe(&mut conn, alice.id, &red, red.id, true).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::CannotSwipeOwnSock));
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn dislike_never_matches() {
        let mut conn = test_conn();
        let alice = insert_user(&mut conn, "alice");
        let bob = insert_user(&mut conn, "bob");
        let red = insert_sock(&mut conn, &alice, "Red");
        let blue = insert_sock(&mut conn, &bob, "Blue");

        swipe(&mut conn, alice.id, &red, blue.id, false).unwrap();
        let back = swipe(&mut conn, bob.id, &blue, red.id, true).unwrap();
        assert!(!back.matched);
        assert!(pair_rows(&mut conn, alice.id, bob.id).unwrap().is_empty());
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn unmatch_keeps_flagged_rows_and_drops_chats_both_ways() {
        let mut conn = test_conn();
        let alice = insert_user(&mut conn, "alice");
        let bob = insert_user(&mut conn, "bob");
        let carol = insert_user(&mut conn, "carol");
        let red = insert_sock(&mut conn, &alice, "Red");
        let blue = insert_sock(&mut conn, &bob, "Blue");

        swipe(&mut conn, alice.id, &red, blue.id, true).unwrap();
        swipe(&mut conn, bob.id, &blue, red.id, true).unwrap();
        chat(&mut conn, &alice, &bob, "hi");
        chat(&mut conn, &bob, &alice, "hey");
        chat(&mut conn, &alice, &carol, "unrelated");

        let other = unmatch(&mut conn, &alice, &bob.username).unwrap();
        assert_eq!(other.id, bob.id);

        let rows = pair_rows(&mut conn, alice.id, bob.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|r| r.unmatched && r.unmatched_at.is_some()));
        assert_eq!(chats_between(&mut conn, &alice, &bob), 0);
        assert_eq!(chats_between(&mut conn, &alice, &carol), 1);
        assert_eq!(pair_state(&mut conn, alice.id, bob.id).unwrap(), Some(MatchState::Unmatched));

        let err = unmatch(&mut conn, &bob, &alice.username).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::AlreadyUnmatched));

        let err = unmatch(&mut conn, &alice, &carol.username).unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::MatchNotFound));

        let list = list_matches(&mut conn, alice.id).unwrap();
        assert!(list.matches.is_empty());
        assert_eq!(list.unmatched.len(), 1);
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn unmatched_pair_never_rematches_or_meets_again() {
        let mut conn = test_conn();
        let alice = insert_user(&mut conn, "alice");
        let bob = insert_user(&mut conn, "bob");
        let red = insert_sock(&mut conn, &alice, "Red");
        let green = insert_sock(&mut conn, &alice, "Green");
        let blue = insert_sock(&mut conn, &bob, "Blue");

        swipe(&mut conn, alice.id, &red, blue.id, true).unwrap();
        swipe(&mut conn, bob.id, &blue, red.id, true).unwrap();
        unmatch(&mut conn, &alice, &bob.username).unwrap();

        for _ in 0..20 {
            let Some(candidate) = next_candidate(&mut conn, alice.id, &green).unwrap() else {
                break;
            };
            assert_ne!(candidate.sock.user_id, bob.id);
        }

        let again = swipe(&mut conn, alice.id, &green, blue.id, true).unwrap();
        let back = swipe(&mut conn, bob.id, &blue, green.id, true).unwrap();
        assert!(!again.matched && !back.matched);
        assert_eq!(pair_rows(&mut conn, alice.id, bob.id).unwrap().len(), 1);
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn next_candidate_skips_own_and_swiped_socks() {
        let mut conn = test_conn();
        let alice = insert_user(&mut conn, "alice");
        let bob = insert_user(&mut conn, "bob");
        let red = insert_sock(&mut conn, &alice, "Red");
        insert_sock(&mut conn, &alice, "Green");
        let blue = insert_sock(&mut conn, &bob, "Blue");

        // other test data may be visible, so only check what must be excluded
        for _ in 0..20 {
            let Some(candidate) = next_candidate(&mut conn, alice.id, &red).unwrap() else {
                break;
            };
            assert_ne!(candidate.sock.user_id, alice.id);
        }

        swipe(&mut conn, alice.id, &red, blue.id, false).unwrap();
        for _ in 0..20 {
            let Some(candidate) = next_candidate(&mut conn, alice.id, &red).unwrap() else {
                break;
            };
            assert_ne!(candidate.sock.id, blue.id);
        }
    }

    #[test]
    #[ignore = "needs DATABASE_URL"]
    fn simultaneous_mutual_likes_always_match() {
        let pool = pool(4);
        let mut setup = db::connection(&pool).unwrap();

        for _ in 0..20 {
            let alice = insert_user(&mut setup, "alice");
            let bob = insert_user(&mut setup, "bob");
            let red = insert_sock(&mut setup, &alice, "Red");
            let blue = insert_sock(&mut setup, &bob, "Blue");
            let barrier = Barrier::new(2);

            std::thread::scope(|s| {
                let left = s.spawn(|| {
                    let mut conn = db::connection(&pool).unwrap();
                    barrier.wait();
                    swipe(&mut conn, alice.id, &red, blue.id, true).unwrap()
                });
                let right = s.spawn(|| {
                    let mut conn = db::connection(&pool).unwrap();
                    barrier.wait();
                    swipe(&mut conn, bob.id, &blue, red.id, true).unwrap()
                });
                let matched = [left.join().unwrap(), right.join().unwrap()]
                    .iter()
                    .filter(|o| o.matched)
                    .count();
                assert_eq!(matched, 1);
            });

            let rows = pair_rows(&mut setup, alice.id, bob.id).unwrap();
            diesel::delete(users::table.filter(users::id.eq_any(vec![alice.id, bob.id])))
                .execute(&mut setup)
                .unwrap();
            assert_eq!(rows.len(), 1);
        }
    }
}
