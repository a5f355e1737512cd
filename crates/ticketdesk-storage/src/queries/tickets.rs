// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket summary queries.

use rusqlite::{Row, params};
use ticketdesk_core::{Ticket, TicketdeskError};

use crate::database::{Database, map_tr_err};

const UPSERT_SQL: &str = "INSERT INTO tickets (id, status, status_class, inbox, subject, agent, \
     date_created, last_activity_at, contact_name, company, description) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
     ON CONFLICT(id) DO UPDATE SET \
       status = excluded.status, \
       status_class = excluded.status_class, \
       inbox = excluded.inbox, \
       subject = excluded.subject, \
       agent = excluded.agent, \
       date_created = excluded.date_created, \
       last_activity_at = excluded.last_activity_at, \
       contact_name = excluded.contact_name, \
       company = excluded.company, \
       description = excluded.description, \
       updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const SELECT_COLUMNS: &str = "id, status, status_class, inbox, subject, agent, date_created, \
     last_activity_at, contact_name, company, description";

fn execute_upsert(
    conn: &rusqlite::Connection,
    sql: &str,
    ticket: &Ticket,
) -> Result<usize, rusqlite::Error> {
    conn.execute(
        sql,
        params![
            ticket.id,
            ticket.status,
            ticket.status_class,
            ticket.inbox,
            ticket.subject,
            ticket.agent,
            ticket.date_created,
            ticket.last_activity_at,
            ticket.contact_name,
            ticket.company,
            ticket.description,
        ],
    )
}

fn ticket_from_row(row: &Row<'_>) -> Result<Ticket, rusqlite::Error> {
    Ok(Ticket {
        id: row.get(0)?,
        status: row.get(1)?,
        status_class: row.get(2)?,
        inbox: row.get(3)?,
        subject: row.get(4)?,
        agent: row.get(5)?,
        date_created: row.get(6)?,
        last_activity_at: row.get(7)?,
        contact_name: row.get(8)?,
        company: row.get(9)?,
        description: row.get(10)?,
    })
}

/// Insert a ticket or replace every field of the existing row.
pub async fn upsert_ticket(db: &Database, ticket: &Ticket) -> Result<(), TicketdeskError> {
    let ticket = ticket.clone();
    db.connection()
        .call(move |conn| {
            execute_upsert(conn, UPSERT_SQL, &ticket)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Upsert a batch of tickets in one transaction.
pub async fn upsert_tickets(db: &Database, tickets: &[Ticket]) -> Result<(), TicketdeskError> {
    if tickets.is_empty() {
        return Ok(());
    }
    let tickets = tickets.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for ticket in &tickets {
                execute_upsert(&tx, UPSERT_SQL, ticket)?;
            }
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Upsert unless the stored row has a later `last_activity_at`.
///
/// Returns `true` when the row was written.
pub async fn upsert_ticket_if_newer(db: &Database, ticket: &Ticket) -> Result<bool, TicketdeskError> {
    let ticket = ticket.clone();
    let sql = format!("{UPSERT_SQL} WHERE excluded.last_activity_at >= tickets.last_activity_at");
    db.connection()
        .call(move |conn| {
            let changed = execute_upsert(conn, &sql, &ticket)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// One page of tickets, most recent activity first.
///
/// `page` is 1-indexed; 0 is treated as 1. Ties on `last_activity_at` are
/// broken by ID so pages are stable.
pub async fn list_tickets(
    db: &Database,
    page: u32,
    per_page: u32,
) -> Result<Vec<Ticket>, TicketdeskError> {
    let limit = i64::from(per_page);
    let offset = i64::from(page.max(1) - 1) * limit;
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM tickets \
                 ORDER BY last_activity_at DESC, id ASC LIMIT ?1 OFFSET ?2"
            ))?;
            let rows = stmt.query_map(params![limit, offset], ticket_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one ticket by ID.
pub async fn get_ticket(db: &Database, id: &str) -> Result<Option<Ticket>, TicketdeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM tickets WHERE id = ?1"),
                params![id],
                ticket_from_row,
            );
            match result {
                Ok(ticket) => Ok(Some(ticket)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Number of cached tickets.
pub async fn count_tickets(db: &Database) -> Result<u64, TicketdeskError> {
    let count: i64 = db
        .connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)?;
    Ok(count.max(0) as u64)
}
