//! Scripted local table.
//!
//! Seats every player on one in-process store, plays a full round, and
//! crashes the first host halfway through so the handover can be watched in
//! the logs.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use game_core::Session;
use runtime::{
    ClientConfig, MemoryConnection, MemoryStore, SessionClient, SessionHandle, StoreConfig,
};

const SLIPS: &[&str] = &[
    "I once met a famous chef",
    "I can't whistle",
    "I have been to Antarctica",
    "I collect teapots",
    "I was a competitive swimmer",
    "I have never seen snow",
    "I can juggle five balls",
    "I learned to drive at thirty",
];

struct Seat {
    client: SessionClient<MemoryConnection>,
    handle: SessionHandle<MemoryConnection>,
}

pub async fn run(
    nicknames: &[String],
    store_config: StoreConfig,
    client_config: ClientConfig,
) -> Result<()> {
    if nicknames.len() < 2 {
        bail!("a table needs at least two players, got {}", nicknames.len());
    }

    let handover_timeout = store_config.liveness_timeout * 3 + store_config.sweep_interval;
    let store = MemoryStore::new(store_config);
    let supervisor = store.start_supervisor();

    let seats = seat_players(&store, nicknames, &client_config).await?;
    let code = seats[0].handle.code().clone();
    println!("Session {code} is open");
    print_roster(&seats[0].handle.snapshot().await?);

    let host = &seats[0].handle;
    host.start_submitting().await?;
    for (seat, slips) in seats.iter().zip(SLIPS.chunks(2).cycle()) {
        for slip in slips {
            seat.handle.add_slip(slip).await?;
        }
    }
    host.start_playing().await?;

    let session = host.snapshot().await?;
    println!("{} slips in the bowl", session.draw_pile.len());

    host.reveal_current().await?;
    if let Some(slip) = host.snapshot().await?.revealed_slip() {
        println!("  {slip}");
    }
    host.advance_slip().await?;

    // The first host's device drops off the network.
    println!("{} lost connection", seats[0].handle.nickname());
    seats[0].client.store().sever();

    let next = &seats[1].handle;
    let session = tokio::time::timeout(handover_timeout, next.wait_until(|s| {
        s.host().is_some_and(|(id, _)| id != seats[0].handle.player_id())
    }))
    .await
    .context("no new host was elected")??;
    let (new_host_id, new_host) = session.host().context("session has no host")?;
    println!("{} is now the host", new_host.nickname);

    let host = seats
        .iter()
        .find(|seat| seat.handle.player_id() == new_host_id)
        .map(|seat| &seat.handle)
        .context("new host is not seated at this table")?;

    loop {
        let session = host.snapshot().await?;
        if session.is_pile_exhausted() {
            break;
        }
        host.reveal_current().await?;
        if let Some(slip) = host.snapshot().await?.revealed_slip() {
            println!("  {slip}");
        }
        host.advance_slip().await?;
    }

    host.retreat_slip().await?;
    if let Some(slip) = host.snapshot().await?.revealed_slip() {
        println!("One more look at the last slip: {slip}");
    }

    let session = host.snapshot().await?;
    println!(
        "Game over after {} slips ({} phase)",
        session.discard_pile.len() + session.draw_pile.len(),
        session.phase
    );

    for seat in seats.into_iter().skip(1) {
        seat.handle.leave().await?;
    }
    supervisor.shutdown().await;
    Ok(())
}

async fn seat_players(
    store: &MemoryStore,
    nicknames: &[String],
    config: &ClientConfig,
) -> Result<Vec<Seat>> {
    let mut seats: Vec<Seat> = Vec::with_capacity(nicknames.len());

    for (offset, nickname) in (0u64..).zip(nicknames) {
        let config = ClientConfig {
            rng_seed: config.rng_seed.map(|seed| seed.wrapping_add(offset)),
            ..config.clone()
        };
        let client = SessionClient::new(store.connect()?, config)?;
        let handle = match seats.first() {
            None => client.create_session(nickname).await?,
            Some(first) => {
                client
                    .join_session(first.handle.code().as_str(), nickname)
                    .await?
            }
        };
        tracing::info!(nickname = %handle.nickname(), player = %handle.player_id(), "seated");
        seats.push(Seat { client, handle });
    }

    Ok(seats)
}

fn print_roster(session: &Session) {
    for (id, player) in session.members() {
        let marker = if player.is_host { " (host)" } else { "" };
        println!("  {} [{}]{}", player.nickname, id, marker);
    }
}
