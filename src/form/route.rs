/// Navigation targets of the interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/`
    List,
    /// `/novo-usuario`
    New,
    /// `/editar-usuario/:id`
    Edit(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::List => "/".to_string(),
            Route::New => "/novo-usuario".to_string(),
            Route::Edit(id) => format!("/editar-usuario/{}", urlencoding::encode(id)),
        }
    }

}
