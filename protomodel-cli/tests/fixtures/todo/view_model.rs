use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Attachment, Page, Priority, TodoItem};
use crate::service::TodoService;

pub struct TodoListViewModel {
    pub title: String,
    pub items: Vec<TodoItem>,
    pub archive: Page<TodoItem>,
    pub attachments: HashMap<Uuid, Attachment>,
    pub counts: HashMap<String, i32>,
    pub selected: Option<Arc<TodoItem>>,
    pub filter_limit: Option<u32>,
    service: Arc<dyn TodoService>,
}

impl TodoListViewModel {
    pub fn new(service: Arc<dyn TodoService>) -> Self {
        Self {
            title: String::new(),
            items: Vec::new(),
            archive: Page {
                items: Vec::new(),
                total: 0,
            },
            attachments: HashMap::new(),
            counts: HashMap::new(),
            selected: None,
            filter_limit: None,
            service,
        }
    }

    pub fn add_item(&mut self, title: String, priority: Priority) {
        let _ = (title, priority);
        self.notify();
    }

    pub async fn refresh_async(&mut self) -> Result<(), std::io::Error> {
        self.items = self.service.load().await?;
        Ok(())
    }

    pub fn remove_item(&mut self, id: Uuid) {
        self.items.retain(|item| item.id != id);
    }

    fn notify(&self) {}
}
