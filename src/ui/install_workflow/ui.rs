use iced::widget::{
    button, checkbox, column, container, progress_bar, row, text, text_input, Column, Container,
};
use iced::{Alignment, Element, Length};

use super::messages::InstallMessage;
use super::state::{InstallPhase, InstallState};
use crate::ui::messages::Message;

/// The install form: storage list, package path and the delete toggle.
pub fn view_install_form(state: &InstallState) -> Element<'_, Message> {
    let title = container(text("Install Software").size(28))
        .width(Length::Fill)
        .padding(15)
        .style(crate::style::bordered_box);

    let mut sections: Vec<Element<'_, Message>> = vec![title.into()];

    if let Some(notice) = &state.notice {
        sections.push(
            container(text(notice).size(14))
                .padding(10)
                .width(Length::Fill)
                .style(crate::style::notice_container)
                .into(),
        );
    }

    sections.push(text("Storage location").size(16).into());
    sections.push(storage_list(state));

    sections.push(text("Software package").size(16).into());
    sections.push(
        row![
            text_input("Path to a .cab package", &state.cab_path)
                .on_input(|value| Message::Install(InstallMessage::CabPathEdited(value)))
                .padding(8)
                .style(crate::style::default_text_input),
            button("Browse...")
                .on_press(Message::Install(InstallMessage::BrowseCab))
                .padding(8)
                .style(button::secondary),
        ]
        .spacing(10)
        .align_y(Alignment::Center)
        .into(),
    );

    sections.push(
        checkbox(state.delete_after)
            .label("Delete the package after installation")
            .on_toggle(|value| Message::Install(InstallMessage::SetDeleteAfter(value)))
            .into(),
    );

    if let Some(error) = &state.form_error {
        sections.push(
            container(text(error).size(14))
                .padding(10)
                .width(Length::Fill)
                .style(crate::style::invalid_message_container)
                .into(),
        );
    }

    // Spacer pushes the buttons to the bottom
    sections.push(
        Container::new(Column::new())
            .height(Length::Fill)
            .width(Length::Fill)
            .into(),
    );

    let cancel_button = button("Cancel")
        .on_press(Message::Install(InstallMessage::Cancel))
        .padding(8)
        .style(button::secondary);

    let install_button = button("Install")
        .on_press(Message::Install(InstallMessage::Confirm))
        .padding(8)
        .style(button::primary);

    sections.push(
        container(
            row![cancel_button, install_button]
                .spacing(15)
                .align_y(Alignment::Center),
        )
        .width(Length::Fill)
        .padding(15)
        .style(crate::style::bordered_box)
        .into(),
    );

    container(
        Column::with_children(sections)
            .spacing(15)
            .width(Length::Fill),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .padding(20)
    .style(crate::style::main_box)
    .into()
}

fn storage_list(state: &InstallState) -> Element<'_, Message> {
    if state.loading_storage {
        return container(text("Reading storage information...").size(14))
            .padding(20)
            .width(Length::Fill)
            .style(crate::style::bordered_box)
            .into();
    }

    if state.storage.is_empty() {
        return container(text("No storage locations available").size(14))
            .padding(20)
            .width(Length::Fill)
            .style(crate::style::bordered_box)
            .into();
    }

    let rows = column(state.storage.iter().enumerate().map(|(i, entry)| {
        let is_selected = Some(i) == state.selected_storage;

        button(text(entry.label()).size(14))
            .width(Length::Fill)
            .padding(10)
            .style(if is_selected {
                button::primary
            } else {
                button::secondary
            })
            .on_press(Message::Install(InstallMessage::SelectStorage(i)))
            .into()
    }))
    .spacing(8);

    container(rows)
        .width(Length::Fill)
        .padding(10)
        .style(crate::style::bordered_box)
        .into()
}

/// Copy progress while the package moves to the device.
pub fn view_install_progress(state: &InstallState) -> Element<'_, Message> {
    let percent = match state.phase {
        InstallPhase::Installing(p) => p,
        _ => 0,
    };

    let detail: Element<'_, Message> = match &state.active_install {
        Some(install) => column![
            text(format!("Copying {}", install.package)).size(16),
            text(format!("to {}", install.destination)).size(14),
        ]
        .spacing(5)
        .align_x(Alignment::Center)
        .into(),
        None => text("Copying package to the device").size(16).into(),
    };

    container(
        column![
            text("Installing Software").size(28),
            detail,
            progress_bar(0.0..=100.0, percent as f32),
            text(format!("{percent}%")).size(14),
        ]
        .spacing(20)
        .align_x(Alignment::Center)
        .width(Length::Fixed(400.0)),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .style(crate::style::main_box)
    .into()
}

/// Final screen: either a success note or the failure text with a retry.
pub fn view_install_completion(state: &InstallState) -> Element<'_, Message> {
    let failed = matches!(&state.phase, InstallPhase::Completion(Err(_)));

    let title = if failed {
        text("Installation Failed").size(24)
    } else {
        text("Installation Started").size(24)
    };

    let detail: Element<'_, Message> = match &state.phase {
        InstallPhase::Completion(Err(reason)) => container(text(reason).size(16))
            .style(crate::style::invalid_message_container)
            .into(),
        _ => {
            let message = match &state.active_install {
                Some(install) => format!(
                    "{} was copied to {}. Check the handset screen to finish setup.",
                    install.package, install.destination
                ),
                None => "The package was copied to the device.".to_string(),
            };
            container(text(message).size(16))
                .style(crate::style::valid_message_container)
                .into()
        }
    };

    let install_another = button("Install Another Package")
        .on_press(Message::Install(InstallMessage::InstallAnother))
        .padding(8)
        .style(button::primary);

    let back = button("Back")
        .on_press(Message::Install(InstallMessage::Cancel))
        .padding(8)
        .style(button::secondary);

    container(
        column![title, detail, row![install_another, back].spacing(15)]
            .spacing(20)
            .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .style(crate::style::main_box)
    .into()
}
