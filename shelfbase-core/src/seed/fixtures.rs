// src/seed/fixtures.rs
//! The fixed sample catalog

use crate::error::Result;
use crate::seed::ids::{AuthorIds, AuthorKey, BookIds, BookKey};
use crate::seed::model::{Author, Book, Review};

struct AuthorRow {
    key: AuthorKey,
    name: &'static str,
    birth_year: i32,
    country: &'static str,
}

struct BookRow {
    key: BookKey,
    title: &'static str,
    author: AuthorKey,
    pages: u32,
    published_year: i32,
    genre: &'static str,
}

struct ReviewRow {
    book: BookKey,
    rating: u8,
    comment: &'static str,
    reviewer_name: &'static str,
}

const AUTHORS: [AuthorRow; 4] = [
    AuthorRow {
        key: AuthorKey::Tolstoy,
        name: "Лев Толстой",
        birth_year: 1828,
        country: "Россия",
    },
    AuthorRow {
        key: AuthorKey::Dostoevsky,
        name: "Фёдор Достоевский",
        birth_year: 1821,
        country: "Россия",
    },
    AuthorRow {
        key: AuthorKey::Orwell,
        name: "Джордж Оруэлл",
        birth_year: 1903,
        country: "Великобритания",
    },
    AuthorRow {
        key: AuthorKey::Garcia,
        name: "Габриэль Гарсиа Маркес",
        birth_year: 1927,
        country: "Колумбия",
    },
];

const BOOKS: [BookRow; 5] = [
    BookRow {
        key: BookKey::War,
        title: "Война и мир",
        author: AuthorKey::Tolstoy,
        pages: 1225,
        published_year: 1869,
        genre: "роман",
    },
    BookRow {
        key: BookKey::Anna,
        title: "Анна Каренина",
        author: AuthorKey::Tolstoy,
        pages: 864,
        published_year: 1877,
        genre: "роман",
    },
    BookRow {
        key: BookKey::Crime,
        title: "Преступление и наказание",
        author: AuthorKey::Dostoevsky,
        pages: 671,
        published_year: 1866,
        genre: "роман",
    },
    BookRow {
        key: BookKey::Orwell,
        title: "1984",
        author: AuthorKey::Orwell,
        pages: 328,
        published_year: 1949,
        genre: "антиутопия",
    },
    BookRow {
        key: BookKey::Solitude,
        title: "Сто лет одиночества",
        author: AuthorKey::Garcia,
        pages: 417,
        published_year: 1967,
        genre: "магический реализм",
    },
];

const REVIEWS: [ReviewRow; 5] = [
    ReviewRow {
        book: BookKey::War,
        rating: 5,
        comment: "Величайший роман всех времён!",
        reviewer_name: "Анна",
    },
    ReviewRow {
        book: BookKey::War,
        rating: 4,
        comment: "Долго читать, но того стоит.",
        reviewer_name: "Иван",
    },
    ReviewRow {
        book: BookKey::Orwell,
        rating: 5,
        comment: "Актуально как никогда.",
        reviewer_name: "Мария",
    },
    ReviewRow {
        book: BookKey::Orwell,
        rating: 3,
        comment: "Мрачновато, но интересно.",
        reviewer_name: "Сергей",
    },
    ReviewRow {
        book: BookKey::Crime,
        rating: 5,
        comment: "Потрясающая глубина персонажей.",
        reviewer_name: "Елена",
    },
];

/// Authors in insertion order
pub fn authors() -> Vec<(AuthorKey, Author)> {
    AUTHORS
        .iter()
        .map(|row| {
            (
                row.key,
                Author {
                    name: row.name.to_string(),
                    birth_year: row.birth_year,
                    country: row.country.to_string(),
                },
            )
        })
        .collect()
}

/// Books in insertion order, linked to the captured author ids
pub fn books(authors: &AuthorIds) -> Result<Vec<(BookKey, Book)>> {
    BOOKS
        .iter()
        .map(|row| {
            Ok((
                row.key,
                Book {
                    title: row.title.to_string(),
                    author_id: authors.get(row.author)?.clone(),
                    pages: row.pages,
                    published_year: row.published_year,
                    genre: row.genre.to_string(),
                },
            ))
        })
        .collect()
}

/// Reviews in insertion order, linked to the resolved book ids
pub fn reviews(books: &BookIds) -> Result<Vec<Review>> {
    REVIEWS
        .iter()
        .map(|row| {
            Ok(Review {
                book_id: books.get(row.book)?.clone(),
                rating: row.rating,
                comment: row.comment.to_string(),
                reviewer_name: row.reviewer_name.to_string(),
            })
        })
        .collect()
}
