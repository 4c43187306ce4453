use serde_json::{json, Value};
use std::collections::HashMap;

pub const USERS: i64 = 10;
pub const POSTS_PER_USER: i64 = 10;
pub const TODOS_PER_USER: i64 = 20;
pub const COMMENTS_PER_POST: i64 = 5;

/// Dataset fijo con la misma forma que jsonplaceholder:
/// users, posts (userId), todos (userId), comments (postId).
pub fn dataset() -> HashMap<String, Vec<Value>> {
    let users: Vec<Value> = (1..=USERS)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Usuario {id}"),
                "username": format!("user{id}"),
                "email": format!("user{id}@example.com"),
            })
        })
        .collect();

    let mut posts = Vec::new();
    let mut comments = Vec::new();
    for user_id in 1..=USERS {
        for n in 0..POSTS_PER_USER {
            let post_id = (user_id - 1) * POSTS_PER_USER + n + 1;
            posts.push(json!({
                "userId": user_id,
                "id": post_id,
                "title": format!("post {post_id} de user{user_id}"),
                "body": "lorem ipsum",
            }));

            for c in 0..COMMENTS_PER_POST {
                let comment_id = (post_id - 1) * COMMENTS_PER_POST + c + 1;
                comments.push(json!({
                    "postId": post_id,
                    "id": comment_id,
                    "email": format!("c{comment_id}@example.com"),
                    "body": "dolor sit amet",
                }));
            }
        }
    }

    let todos: Vec<Value> = (1..=USERS)
        .flat_map(|user_id| {
            (0..TODOS_PER_USER).map(move |n| {
                let id = (user_id - 1) * TODOS_PER_USER + n + 1;
                json!({
                    "userId": user_id,
                    "id": id,
                    "title": format!("todo {id}"),
                    "completed": id % 3 == 0,
                })
            })
        })
        .collect();

    let mut resources = HashMap::new();
    resources.insert("users".to_string(), users);
    resources.insert("posts".to_string(), posts);
    resources.insert("todos".to_string(), todos);
    resources.insert("comments".to_string(), comments);
    resources
}
