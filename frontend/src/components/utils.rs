use super::super::Model;
use yew::prelude::*;

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <p class="error-message" style="color: red;">{ error_msg }</p>
        }
    } else {
        html! {}
    }
}
